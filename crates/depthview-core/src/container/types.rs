//! Core types for image containers.

use std::fmt;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for loading and scanning a container.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The file does not exist or could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but holds no bytes.
    #[error("Container is empty: {0}")]
    EmptyInput(PathBuf),

    /// The file exceeds the configured size limit.
    #[error("Container too large: {size} bytes (limit: {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    /// No end-of-image marker was found anywhere in the buffer.
    #[error("No end-of-image marker found in {scanned} bytes")]
    NoDelimiterFound { scanned: usize },
}

impl ContainerError {
    /// Returns true if the container was readable but its content is unusable.
    ///
    /// Callers use this to pick a "corrupt file" message over an I/O one.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            ContainerError::EmptyInput(_) | ContainerError::NoDelimiterFound { .. }
        )
    }
}

/// An immutable, cheaply cloneable byte buffer holding a whole container.
///
/// Clones share the same allocation, so the decode and detection paths can
/// hold it at the same time without copying.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    bytes: Arc<[u8]>,
}

impl ImageBuffer {
    /// Wrap owned bytes.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the bytes covered by `range`, or `None` if it lies outside the buffer.
    pub fn slice(&self, range: SubImageRange) -> Option<&[u8]> {
        self.bytes.get(range.as_range())
    }
}

impl From<Vec<u8>> for ImageBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A half-open byte range `[start, end)` delimiting one encoded sub-image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubImageRange {
    /// Offset of the first byte of the sub-image.
    pub start: usize,
    /// Offset one past the last byte (just after the end marker).
    pub end: usize,
}

impl SubImageRange {
    /// Create a range, returning `None` unless `start < end`.
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Length of the range in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Ranges are never empty once constructed through [`SubImageRange::new`].
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Convert to a std range for slicing.
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}
