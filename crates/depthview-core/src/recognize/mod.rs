//! Barcode/QR recognition over the primary image.
//!
//! Detection itself is an external capability behind [`CodeDetector`]. This
//! module runs it, applies the match policy and reduces the result to one
//! [`RecognitionOutcome`]:
//!
//! ```text
//! Pending -> NoCode | MatchFound(code) | NoMatch(code) | Failed(error)
//! ```

mod coordinator;
mod types;

pub use coordinator::{
    classify, CodeDetector, CodeMatcher, OutcomeSlot, RecognitionCoordinator, RecognitionState,
    ReferenceCode, DEFAULT_REFERENCE_CODE,
};
pub use types::{Barcode, BarcodeFormat, DetectError, RecognitionOutcome, Verdict};
