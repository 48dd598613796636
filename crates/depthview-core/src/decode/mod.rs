//! Bounded image decoding for depthview.
//!
//! This module provides functionality for:
//! - Reading the natural size of an encoded image from its header
//! - Choosing an integer downsample factor from a size cap
//! - Decoding one sub-image of a container without exceeding the cap
//!
//! # Memory Strategy
//!
//! The cap bounds the size of every image kept for display. The decoder is
//! additionally handed an allocation ceiling through `DecodeOptions::max_alloc`
//! so a hostile header cannot trigger an oversized allocation.
//!
//! # Examples
//!
//! ```ignore
//! use depthview_core::decode::{decode_bounded, DecodeOptions};
//!
//! let image = decode_bounded(&buffer, range, &DecodeOptions::with_cap(1024))?;
//! assert!(image.width <= 1024 && image.height <= 1024);
//! ```

mod bounded;
mod types;

pub use bounded::{
    decode_bounded, decode_bytes_bounded, downsample, probe_dimensions, sample_factor,
    scaled_dimensions,
};
pub use types::{DecodeError, DecodeOptions, DecodedImage, DEFAULT_DOWNSAMPLE_CAP};
