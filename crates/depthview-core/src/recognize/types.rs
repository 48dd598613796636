//! Core types for code recognition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a detection capability.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Code detection failed: {0}")]
pub struct DetectError(pub String);

/// Symbology of a detected code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarcodeFormat {
    QrCode,
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Code128,
    Code39,
    Code93,
    Codabar,
    Interleaved2of5,
    DataMatrix,
    Pdf417,
    Aztec,
    /// The detector did not report a symbology.
    Unknown,
}

/// A code found in an image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Barcode {
    /// Decoded payload.
    pub value: String,
    /// Symbology the payload was read from.
    pub format: BarcodeFormat,
}

impl Barcode {
    pub fn new(value: impl Into<String>, format: BarcodeFormat) -> Self {
        Self {
            value: value.into(),
            format,
        }
    }
}

/// Terminal result of running recognition on one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionOutcome {
    /// Detection ran and found nothing.
    NoCode,
    /// A detected code matched.
    MatchFound(Barcode),
    /// Codes were detected but none matched. Carries the first one.
    NoMatch(Barcode),
    /// The detection capability failed; the result is unavailable.
    Failed(DetectError),
}

/// Which dialog the presentation layer should show for an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Recyclable,
    NotRecyclable,
    NoCode,
    Unavailable,
}

impl RecognitionOutcome {
    /// Map this outcome to a dialog choice.
    pub fn verdict(&self) -> Verdict {
        match self {
            RecognitionOutcome::NoCode => Verdict::NoCode,
            RecognitionOutcome::MatchFound(_) => Verdict::Recyclable,
            RecognitionOutcome::NoMatch(_) => Verdict::NotRecyclable,
            RecognitionOutcome::Failed(_) => Verdict::Unavailable,
        }
    }

    /// The code the outcome refers to, if any.
    pub fn code(&self) -> Option<&Barcode> {
        match self {
            RecognitionOutcome::MatchFound(code) | RecognitionOutcome::NoMatch(code) => Some(code),
            RecognitionOutcome::NoCode | RecognitionOutcome::Failed(_) => None,
        }
    }
}
