//! Orientation model and exact pixel remapping.
//!
//! # Coordinate System
//!
//! - Origin is the top-left pixel, x grows right, y grows down
//! - A transform is an integer 2x2 matrix with entries in {-1, 0, 1}
//!
//! Each source pixel `(x, y)` is mapped to `M * (x, y)` and the result is
//! shifted so the smallest coordinate lands on 0. No interpolation happens, so
//! applying a transform and then its inverse restores the exact pixels.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl Orientation {
    /// Map a capture rotation in degrees plus a mirror flag to an orientation.
    ///
    /// `degrees` is the clockwise rotation needed to display the image upright
    /// and must be a multiple of 90 (negative values and values past 360 wrap).
    /// Returns `None` for other angles.
    pub fn from_degrees(degrees: i32, mirrored: bool) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        let orientation = match (degrees.rem_euclid(360), mirrored) {
            (0, false) => Orientation::Normal,
            (90, false) => Orientation::Rotate90CW,
            (180, false) => Orientation::Rotate180,
            (270, false) => Orientation::Rotate270CW,
            (0, true) => Orientation::FlipHorizontal,
            (90, true) => Orientation::Transverse,
            (180, true) => Orientation::FlipVertical,
            (270, true) => Orientation::Transpose,
            _ => return None,
        };
        Some(orientation)
    }

    /// Returns true if this orientation swaps width and height dimensions.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }

    /// The pixel transform that displays an image with this orientation upright.
    pub fn transform(self) -> OrientationTransform {
        OrientationTransform::from(self)
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// A rotation/flip as an integer matrix `[[a, b], [c, d]]`.
///
/// The matrix maps `(x, y)` to `(a*x + b*y, c*x + d*y)`. Only the eight
/// orthogonal matrices with entries in {-1, 0, 1} can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrientationTransform {
    m: [[i8; 2]; 2],
}

impl OrientationTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        m: [[1, 0], [0, 1]],
    };

    /// Build a transform from matrix rows, returning `None` unless the
    /// matrix is one of the eight rotation/flip matrices.
    pub fn from_matrix(m: [[i8; 2]; 2]) -> Option<Self> {
        let axis_aligned = (m[0][1] == 0 && m[1][0] == 0 && m[0][0] != 0 && m[1][1] != 0)
            || (m[0][0] == 0 && m[1][1] == 0 && m[0][1] != 0 && m[1][0] != 0);
        let unit = m.iter().flatten().all(|v| (-1..=1).contains(v));
        (axis_aligned && unit).then_some(Self { m })
    }

    /// Matrix rows.
    pub fn matrix(&self) -> [[i8; 2]; 2] {
        self.m
    }

    /// Returns true if this transform leaves images unchanged.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Returns true if the transform maps width to height.
    pub fn swaps_dimensions(&self) -> bool {
        self.m[0][0] == 0
    }

    /// The inverse transform. For orthogonal matrices this is the transpose.
    pub fn inverse(&self) -> Self {
        let [[a, b], [c, d]] = self.m;
        Self {
            m: [[a, c], [b, d]],
        }
    }

    /// The transform equivalent to applying `self` first and then `next`.
    pub fn then(&self, next: &Self) -> Self {
        let [[a, b], [c, d]] = next.m;
        let [[e, f], [g, h]] = self.m;
        Self {
            m: [
                [a * e + b * g, a * f + b * h],
                [c * e + d * g, c * f + d * h],
            ],
        }
    }

    /// Output dimensions for an input of `width x height`.
    pub fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Apply the transform to `image`, returning a new image.
    ///
    /// The input is not modified. The identity transform returns a clone.
    pub fn correct(&self, image: &DecodedImage) -> DecodedImage {
        if self.is_identity() || image.is_empty() {
            return image.clone();
        }

        let (w, h) = (image.width as i64, image.height as i64);
        let (dst_w, dst_h) = self.output_dimensions(image.width, image.height);
        let [[a, b], [c, d]] = self.m.map(|row| row.map(i64::from));

        // Shift so the mapped image starts at the origin
        let off_x = -(a * (w - 1)).min(0) - (b * (h - 1)).min(0);
        let off_y = -(c * (w - 1)).min(0) - (d * (h - 1)).min(0);

        let mut output = vec![0u8; image.pixels.len()];
        let dst_stride = dst_w as usize;

        for y in 0..h {
            for x in 0..w {
                let dx = (a * x + b * y + off_x) as usize;
                let dy = (c * x + d * y + off_y) as usize;

                let src_idx = (y as usize * w as usize + x as usize) * 3;
                let dst_idx = (dy * dst_stride + dx) * 3;
                output[dst_idx..dst_idx + 3].copy_from_slice(&image.pixels[src_idx..src_idx + 3]);
            }
        }

        DecodedImage::new(dst_w, dst_h, output)
    }
}

impl Default for OrientationTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Orientation> for OrientationTransform {
    fn from(orientation: Orientation) -> Self {
        let m = match orientation {
            Orientation::Normal => [[1, 0], [0, 1]],
            Orientation::FlipHorizontal => [[-1, 0], [0, 1]],
            Orientation::Rotate180 => [[-1, 0], [0, -1]],
            Orientation::FlipVertical => [[1, 0], [0, -1]],
            Orientation::Transpose => [[0, 1], [1, 0]],
            Orientation::Rotate90CW => [[0, -1], [1, 0]],
            Orientation::Transverse => [[0, -1], [-1, 0]],
            Orientation::Rotate270CW => [[0, 1], [-1, 0]],
        };
        Self { m }
    }
}

/// Apply `transform` to `image`. Free-function form of [`OrientationTransform::correct`].
pub fn correct(image: &DecodedImage, transform: &OrientationTransform) -> DecodedImage {
    transform.correct(image)
}
