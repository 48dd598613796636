//! Asynchronous recognition and match policy.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use super::{Barcode, DetectError, RecognitionOutcome};
use crate::decode::DecodedImage;

/// Default reference value matched by [`ReferenceCode`].
pub const DEFAULT_REFERENCE_CODE: &str = "9300675024235";

/// An external code detection capability.
///
/// Implementations may complete on any thread and may take arbitrarily long.
pub trait CodeDetector: Send + Sync {
    /// Detect every code visible in `image`.
    fn detect(
        &self,
        image: Arc<DecodedImage>,
    ) -> impl Future<Output = Result<Vec<Barcode>, DetectError>> + Send;
}

impl<D: CodeDetector> CodeDetector for Arc<D> {
    fn detect(
        &self,
        image: Arc<DecodedImage>,
    ) -> impl Future<Output = Result<Vec<Barcode>, DetectError>> + Send {
        (**self).detect(image)
    }
}

/// Decides whether a detected code counts as a match.
pub trait CodeMatcher: Send + Sync {
    fn is_match(&self, code: &Barcode) -> bool;
}

impl<F> CodeMatcher for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_match(&self, code: &Barcode) -> bool {
        self(&code.value)
    }
}

/// Matches codes equal to one fixed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCode(String);

impl ReferenceCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl Default for ReferenceCode {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_CODE)
    }
}

impl CodeMatcher for ReferenceCode {
    fn is_match(&self, code: &Barcode) -> bool {
        code.value == self.0
    }
}

/// Classify a detection result under `matcher`.
///
/// An empty list is `NoCode`. Otherwise the first matching code wins, and if
/// none matches the first detected code is reported with `NoMatch`.
pub fn classify(codes: &[Barcode], matcher: &impl CodeMatcher) -> RecognitionOutcome {
    let Some(first) = codes.first() else {
        return RecognitionOutcome::NoCode;
    };
    match codes.iter().find(|code| matcher.is_match(code)) {
        Some(code) => RecognitionOutcome::MatchFound(code.clone()),
        None => RecognitionOutcome::NoMatch(first.clone()),
    }
}

/// Runs a [`CodeDetector`] and turns its result into a [`RecognitionOutcome`].
#[derive(Debug, Clone)]
pub struct RecognitionCoordinator<D, M = ReferenceCode> {
    detector: D,
    matcher: M,
}

impl<D: CodeDetector, M: CodeMatcher> RecognitionCoordinator<D, M> {
    pub fn new(detector: D, matcher: M) -> Self {
        Self { detector, matcher }
    }

    /// Run detection on `image` and resolve to exactly one outcome.
    ///
    /// A detector failure resolves to `RecognitionOutcome::Failed` rather than
    /// `NoCode`, so callers can tell the two apart.
    pub async fn recognize(&self, image: Arc<DecodedImage>) -> RecognitionOutcome {
        match self.detector.detect(image).await {
            Ok(codes) => {
                log::debug!("Detector returned {} code(s)", codes.len());
                classify(&codes, &self.matcher)
            }
            Err(err) => {
                log::warn!("{}", err);
                RecognitionOutcome::Failed(err)
            }
        }
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }
}

/// Recognition progress for one image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecognitionState {
    #[default]
    Pending,
    Resolved(RecognitionOutcome),
}

/// Holds the single outcome allowed per session.
///
/// The first call to [`OutcomeSlot::resolve`] moves the slot out of
/// `Pending`; later calls are rejected.
#[derive(Debug, Default)]
pub struct OutcomeSlot {
    state: Mutex<RecognitionState>,
}

impl OutcomeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `outcome` if the slot is still pending. Returns true if stored.
    pub fn resolve(&self, outcome: RecognitionOutcome) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != RecognitionState::Pending {
            return false;
        }
        *state = RecognitionState::Resolved(outcome);
        true
    }

    pub fn state(&self) -> RecognitionState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state(), RecognitionState::Resolved(_))
    }
}
