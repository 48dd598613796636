//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default downsample cap in pixels.
pub const DEFAULT_DOWNSAMPLE_CAP: u32 = 1024;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The decode options cannot be satisfied (for example a zero cap).
    #[error("Invalid decode options: {0}")]
    InvalidOptions(String),

    /// The byte range is not a recognized image encoding.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image data is corrupted or incomplete.
    #[error("Corrupted or incomplete image data: {0}")]
    CorruptedFile(String),

    /// Decoding would exceed the configured allocation limit.
    #[error("Out of memory during decoding")]
    OutOfMemory,
}

/// Immutable decode configuration, computed once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Maximum width or height of a decoded image.
    pub cap: u32,
    /// Upper bound on bytes the underlying decoder may allocate.
    /// `None` leaves the decoder's own default in place.
    pub max_alloc: Option<u64>,
}

impl DecodeOptions {
    /// Options with the given cap and no extra allocation limit.
    pub fn with_cap(cap: u32) -> Self {
        Self {
            cap,
            max_alloc: None,
        }
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::with_cap(DEFAULT_DOWNSAMPLE_CAP)
    }
}

/// A decoded image with RGB pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    /// Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Create a new DecodedImage with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize) * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a DecodedImage from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        let pixels = img.into_raw();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert to an image::RgbImage for further processing.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Get the RGB value at (x, y).
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
