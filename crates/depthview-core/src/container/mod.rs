//! Image container loading and splitting.
//!
//! This module provides functionality for:
//! - Reading a container file into memory in one step
//! - Locating the sub-images packed back to back inside it
//!
//! # Examples
//!
//! ```ignore
//! use depthview_core::container::{load_buffer, scan};
//!
//! let buffer = load_buffer("capture.jpg")?;
//! for range in scan(&buffer)? {
//!     println!("sub-image at {}..{}", range.start, range.end);
//! }
//! ```

mod loader;
mod scanner;
mod types;

pub use loader::{load_buffer, load_buffer_with_limit};
pub use scanner::{scan, trailing_bytes, END_MARKER};
pub use types::{ContainerError, ImageBuffer, SubImageRange};
