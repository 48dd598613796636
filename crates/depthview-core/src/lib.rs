//! Depthview Core - Photo viewer library
//!
//! This crate provides the core of the depthview photo viewer: splitting
//! multi-image JPEG containers, memory-bounded decoding, orientation
//! correction, a paged image cache and barcode recognition on the primary
//! image.
//!
//! The `session` feature (enabled by default) adds [`session::ViewingSession`],
//! which runs the whole pipeline on a Tokio runtime. Without it the crate
//! builds for `wasm32-unknown-unknown`.

pub mod config;
pub mod container;
pub mod decode;
pub mod orient;
pub mod pager;
pub mod recognize;
#[cfg(feature = "session")]
pub mod session;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, ViewerConfig};
pub use container::{load_buffer, scan, ContainerError, ImageBuffer, SubImageRange};
pub use decode::{decode_bounded, DecodeError, DecodeOptions, DecodedImage};
pub use orient::{Orientation, OrientationTransform};
pub use pager::{PagedImageCache, Pager, PreRenderWindow};
pub use recognize::{
    Barcode, CodeDetector, CodeMatcher, RecognitionCoordinator, RecognitionOutcome, Verdict,
};
#[cfg(feature = "session")]
pub use session::{SessionError, SessionEvent, SessionHandle, SessionParams, ViewingSession};
