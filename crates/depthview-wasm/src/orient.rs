//! Orientation correction bindings.

use depthview_core::orient::{read_orientation, Orientation};
use wasm_bindgen::prelude::*;

use crate::types::JsDecodedImage;

/// Rotate and mirror an image upright for a capture orientation.
///
/// # Arguments
///
/// * `image` - Decoded primary image
/// * `degrees` - Clockwise sensor rotation: 0, 90, 180 or 270
/// * `mirrored` - Whether the capture was mirrored (front camera)
///
/// # Errors
///
/// Returns an error for any other rotation angle.
#[wasm_bindgen]
pub fn correct_orientation(
    image: &JsDecodedImage,
    degrees: i32,
    mirrored: bool,
) -> Result<JsDecodedImage, JsValue> {
    let orientation = Orientation::from_degrees(degrees, mirrored)
        .ok_or_else(|| JsValue::from_str(&format!("Unsupported rotation: {degrees}")))?;
    Ok(apply(image, orientation))
}

/// Correct an image for an EXIF orientation code (1-8).
///
/// Unknown codes leave the image unchanged.
#[wasm_bindgen]
pub fn correct_exif_orientation(image: &JsDecodedImage, code: u32) -> JsDecodedImage {
    apply(image, Orientation::from(code))
}

/// Read the EXIF orientation code from encoded image bytes.
///
/// Returns 1 (normal) when the tag is missing or unreadable.
#[wasm_bindgen]
pub fn exif_orientation(bytes: &[u8]) -> u32 {
    read_orientation(bytes).unwrap_or_default() as u32
}

fn apply(image: &JsDecodedImage, orientation: Orientation) -> JsDecodedImage {
    let transform = orientation.transform();
    JsDecodedImage::from_decoded(transform.correct(&image.to_decoded()))
}
