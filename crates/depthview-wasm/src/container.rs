//! Container splitting and bounded decoding bindings.
//!
//! # Example
//!
//! ```typescript
//! import { scan_container, decode_sub_image } from '@depthview/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const ranges = scan_container(bytes); // [{ start, end }, ...]
//! const primary = decode_sub_image(bytes, 0, 1024);
//! ```

use depthview_core::container::{scan, ImageBuffer, SubImageRange};
use depthview_core::decode::{decode_bounded, DecodeOptions, DecodedImage};
use wasm_bindgen::prelude::*;

use crate::types::{js_error, JsDecodedImage};

/// Locate the sub-images in a container.
///
/// Returns an array of `{ start, end }` byte ranges in container order.
///
/// # Errors
///
/// Returns an error if the bytes are empty or hold no end-of-image marker.
#[wasm_bindgen]
pub fn scan_container(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let ranges = scan_ranges(bytes)?;
    serde_wasm_bindgen::to_value(&ranges).map_err(js_error)
}

/// Decode the `index`-th sub-image (0-based) so neither edge exceeds `cap`.
///
/// # Errors
///
/// Returns an error if the container cannot be split, `index` is out of
/// range, or the sub-image fails to decode.
#[wasm_bindgen]
pub fn decode_sub_image(bytes: &[u8], index: usize, cap: u32) -> Result<JsDecodedImage, JsValue> {
    decode_nth(bytes, index, cap)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e))
}

fn scan_ranges(bytes: &[u8]) -> Result<Vec<SubImageRange>, String> {
    scan(&ImageBuffer::from(bytes.to_vec())).map_err(|e| e.to_string())
}

fn decode_nth(bytes: &[u8], index: usize, cap: u32) -> Result<DecodedImage, String> {
    let buffer = ImageBuffer::from(bytes.to_vec());
    let ranges = scan(&buffer).map_err(|e| e.to_string())?;
    let range = ranges.get(index).copied().ok_or_else(|| {
        format!(
            "Sub-image {} out of range, container holds {}",
            index,
            ranges.len()
        )
    })?;
    decode_bounded(&buffer, range, &DecodeOptions::with_cap(cap)).map_err(|e| e.to_string())
}
