//! Session inputs, outputs and errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::container::ContainerError;
use crate::decode::DecodeError;
use crate::orient::Orientation;
use crate::recognize::RecognitionOutcome;

/// Error types that end a viewing session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The container could not be loaded or split.
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// The primary image failed to decode.
    #[error("Primary image could not be decoded: {0}")]
    PrimaryDecode(#[from] DecodeError),

    /// A background worker panicked or was aborted.
    #[error("Session worker stopped: {0}")]
    Worker(String),

    /// The session was torn down before it finished.
    #[error("Session cancelled")]
    Cancelled,
}

/// Inputs supplied by whoever opens the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// Container file to display.
    pub path: PathBuf,
    /// Capture orientation. `None` reads it from the primary image's EXIF data.
    pub orientation: Option<Orientation>,
    /// Whether the container carries a secondary (depth) image.
    pub has_secondary: bool,
}

impl SessionParams {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            orientation: None,
            has_secondary: false,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_secondary(mut self, has_secondary: bool) -> Self {
        self.has_secondary = has_secondary;
        self
    }
}

/// Notifications delivered to the presentation layer.
#[derive(Debug)]
pub enum SessionEvent {
    /// A decoded image was appended to the page cache.
    PageAppended { page: usize },
    /// A secondary sub-image (1-indexed position in the container) failed to
    /// decode. The session continues without it.
    SecondaryUnavailable { sub_image: usize, reason: DecodeError },
    /// Recognition finished. Sent at most once per session.
    Recognized(RecognitionOutcome),
    /// The session failed. No further events follow.
    Failed(SessionError),
    /// Every stage finished. No further events follow.
    Completed,
}

impl SessionEvent {
    /// Returns true for the last event a session sends.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionEvent::Failed(_) | SessionEvent::Completed)
    }
}
