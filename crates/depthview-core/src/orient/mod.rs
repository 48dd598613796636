//! Orientation correction for decoded images.
//!
//! The capture pipeline records how the sensor was held as an orientation
//! code. It is turned into an [`OrientationTransform`] once per session and
//! applied to the primary image after decoding.
//!
//! # Examples
//!
//! ```ignore
//! use depthview_core::orient::Orientation;
//!
//! let transform = Orientation::from_degrees(90, false).unwrap().transform();
//! let upright = transform.correct(&decoded);
//! ```

mod metadata;
mod transform;

pub use metadata::{orientation_or_normal, read_orientation};
pub use transform::{correct, Orientation, OrientationTransform};
