//! Memory-bounded decoding with integer downsampling.
//!
//! # Policy
//!
//! The natural size of the encoded image is read from its header first. If
//! either side exceeds the cap, both sides are divided by the same integer
//! factor:
//!
//! ```text
//! factor = max(width / cap + 1, height / cap + 1)
//! ```
//!
//! The factor is not rounded to a power of two. Each output pixel is the box
//! average of a `factor x factor` block of source pixels.

use std::io::Cursor;

use image::error::ImageError as CodecError;
use image::{ImageReader, Limits};

use super::{DecodeError, DecodeOptions, DecodedImage};
use crate::container::{ImageBuffer, SubImageRange};

/// Compute the integer downsample factor for an image of `width x height`.
///
/// Returns 1 when both sides already fit within `cap`. A zero cap is treated
/// as 1 so the result is always defined.
pub fn sample_factor(width: u32, height: u32, cap: u32) -> u32 {
    let cap = cap.max(1);
    if width.max(height) <= cap {
        return 1;
    }
    let scale_x = width / cap + 1;
    let scale_y = height / cap + 1;
    scale_x.max(scale_y)
}

/// Output dimensions after applying [`sample_factor`].
pub fn scaled_dimensions(width: u32, height: u32, cap: u32) -> (u32, u32) {
    let factor = sample_factor(width, height, cap);
    if factor == 1 {
        return (width, height);
    }
    ((width / factor).max(1), (height / factor).max(1))
}

/// Read the natural dimensions of an encoded image without decoding pixels.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized.
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    open_reader(bytes, None)?
        .into_dimensions()
        .map_err(map_codec_error)
}

/// Decode the sub-image at `range` inside `buffer`, bounded by `options.cap`.
///
/// # Errors
///
/// - `DecodeError::InvalidOptions` - the cap is zero
/// - `DecodeError::CorruptedFile` - the range lies outside the buffer or the data is damaged
/// - `DecodeError::InvalidFormat` - the bytes are not a recognized image
/// - `DecodeError::OutOfMemory` - decoding would exceed `options.max_alloc`
pub fn decode_bounded(
    buffer: &ImageBuffer,
    range: SubImageRange,
    options: &DecodeOptions,
) -> Result<DecodedImage, DecodeError> {
    let bytes = buffer.slice(range).ok_or_else(|| {
        DecodeError::CorruptedFile(format!(
            "range {}..{} outside buffer of {} bytes",
            range.start,
            range.end,
            buffer.len()
        ))
    })?;
    decode_bytes_bounded(bytes, options)
}

/// Decode a standalone encoded image, bounded by `options.cap`.
pub fn decode_bytes_bounded(
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<DecodedImage, DecodeError> {
    if options.cap == 0 {
        return Err(DecodeError::InvalidOptions(
            "downsample cap must be non-zero".to_string(),
        ));
    }

    let (width, height) = probe_dimensions(bytes)?;
    let factor = sample_factor(width, height, options.cap);

    let img = open_reader(bytes, options.max_alloc)?
        .decode()
        .map_err(map_codec_error)?;
    let decoded = DecodedImage::from_rgb_image(img.into_rgb8());
    let output = downsample(decoded, factor);

    log::debug!(
        "Decoded {}x{} with sample factor {} -> {}x{}",
        width,
        height,
        factor,
        output.width,
        output.height
    );

    Ok(output)
}

/// Shrink `image` by an integer `factor`, averaging each `factor x factor` block.
///
/// Partial blocks at the right and bottom edges are dropped, except when the
/// image is narrower than one block, in which case the single output column
/// or row averages what is there.
pub fn downsample(image: DecodedImage, factor: u32) -> DecodedImage {
    if factor <= 1 || image.is_empty() {
        return image;
    }

    let out_w = (image.width / factor).max(1);
    let out_h = (image.height / factor).max(1);
    let mut output = Vec::with_capacity(out_w as usize * out_h as usize * 3);

    for oy in 0..out_h {
        let y0 = oy * factor;
        let y1 = (y0 + factor).min(image.height);
        for ox in 0..out_w {
            let x0 = ox * factor;
            let x1 = (x0 + factor).min(image.width);

            let mut sum = [0u64; 3];
            for y in y0..y1 {
                for x in x0..x1 {
                    let [r, g, b] = image.pixel(x, y);
                    sum[0] += r as u64;
                    sum[1] += g as u64;
                    sum[2] += b as u64;
                }
            }

            let count = ((x1 - x0) as u64) * ((y1 - y0) as u64);
            for channel in sum {
                output.push(((channel + count / 2) / count) as u8);
            }
        }
    }

    DecodedImage::new(out_w, out_h, output)
}

fn open_reader(
    bytes: &[u8],
    max_alloc: Option<u64>,
) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    if let Some(max_alloc) = max_alloc {
        let mut limits = Limits::default();
        limits.max_alloc = Some(max_alloc);
        reader.limits(limits);
    }

    Ok(reader)
}

fn map_codec_error(err: CodecError) -> DecodeError {
    match err {
        CodecError::Limits(_) => DecodeError::OutOfMemory,
        CodecError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}
