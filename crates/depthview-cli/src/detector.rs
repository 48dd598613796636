//! QR detection backed by rqrr.

use std::sync::Arc;

use depthview_core::decode::DecodedImage;
use depthview_core::recognize::{Barcode, BarcodeFormat, CodeDetector, DetectError};
use rqrr::PreparedImage;

/// Detects QR codes on a blocking worker thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDetector;

impl CodeDetector for RqrrDetector {
    async fn detect(&self, image: Arc<DecodedImage>) -> Result<Vec<Barcode>, DetectError> {
        tokio::task::spawn_blocking(move || detect_blocking(&image))
            .await
            .map_err(|e| DetectError(format!("detector task stopped: {e}")))
    }
}

fn detect_blocking(image: &DecodedImage) -> Vec<Barcode> {
    if image.is_empty() {
        return Vec::new();
    }
    let (width, height) = (image.width as usize, image.height as usize);
    let grey = to_greyscale(image);
    let mut prepared = PreparedImage::prepare_from_greyscale(width, height, |x, y| {
        grey[y * width + x]
    });

    let grids = prepared.detect_grids();
    log::debug!("Found {} candidate grid(s)", grids.len());
    grids
        .iter()
        .filter_map(|grid| match grid.decode() {
            Ok((_, content)) => Some(Barcode::new(content, BarcodeFormat::QrCode)),
            Err(e) => {
                log::debug!("Skipping unreadable grid: {}", e);
                None
            }
        })
        .collect()
}

/// ITU-R BT.601 luminance, `(77R + 150G + 29B) >> 8`.
fn to_greyscale(image: &DecodedImage) -> Vec<u8> {
    image
        .pixels
        .chunks_exact(3)
        .map(|rgb| {
            let (r, g, b) = (rgb[0] as u32, rgb[1] as u32, rgb[2] as u32);
            ((77 * r + 150 * g + 29 * b) >> 8) as u8
        })
        .collect()
}
