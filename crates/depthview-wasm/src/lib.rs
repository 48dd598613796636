//! Depthview WASM - WebAssembly bindings for depthview
//!
//! This crate exposes the depthview-core viewer pipeline to JavaScript.
//! Detection is left to the browser; the session runner is not available
//! here, so callers drive the stages themselves.
//!
//! # Module Structure
//!
//! - `container` - Container splitting and bounded decoding
//! - `orient` - Orientation correction
//! - `pager` - Paged image cache with a pre-render window
//! - `recognize` - Classification of detected codes
//! - `types` - WASM-compatible wrapper types for image data
//!
//! # Usage
//!
//! ```typescript
//! import init, { scan_container, decode_sub_image, correct_orientation } from '@depthview/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const primary = correct_orientation(decode_sub_image(bytes, 0, 1024), 90, false);
//! console.log(`Decoded ${primary.width}x${primary.height}`);
//! ```

use wasm_bindgen::prelude::*;

mod container;
mod orient;
mod pager;
mod recognize;
mod types;

pub use container::{decode_sub_image, scan_container};
pub use orient::{correct_exif_orientation, correct_orientation, exif_orientation};
pub use pager::JsPageCache;
pub use recognize::classify_codes;
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Default maximum edge length of a decoded page.
#[wasm_bindgen]
pub fn default_downsample_cap() -> u32 {
    depthview_core::decode::DEFAULT_DOWNSAMPLE_CAP
}

/// Encode a gradient of the given size as JPEG.
#[cfg(test)]
pub(crate) fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
    use image::codecs::jpeg::JpegEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    let pixels: Vec<u8> = (0..width * height * 3).map(|i| (i % 256) as u8).collect();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .write_image(&pixels, width, height, ExtendedColorType::Rgb8)
        .unwrap();
    out
}
