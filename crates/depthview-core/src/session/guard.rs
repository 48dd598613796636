//! Teardown-aware access to the cache and the event channel.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::UnboundedSender;

use super::{SessionError, SessionEvent};
use crate::decode::DecodedImage;
use crate::pager::PagedImageCache;
use crate::recognize::{OutcomeSlot, RecognitionOutcome};

/// Teardown flag shared by a session's handle and its workers.
///
/// Work guarded by [`Teardown::run_if_live`] holds the lock, so once
/// [`Teardown::cancel`] returns no guarded work can start or be in progress.
#[derive(Debug, Default)]
pub(crate) struct Teardown {
    torn_down: Mutex<bool>,
}

impl Teardown {
    pub(crate) fn cancel(&self) {
        *self.torn_down.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        *self.torn_down.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn run_if_live<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        let torn_down = self.torn_down.lock().unwrap_or_else(PoisonError::into_inner);
        if *torn_down {
            return None;
        }
        Some(f())
    }
}

/// Everything a session worker may write to, behind the teardown check.
#[derive(Debug, Clone)]
pub(crate) struct SessionGuard {
    teardown: Arc<Teardown>,
    events: UnboundedSender<SessionEvent>,
    cache: PagedImageCache,
    outcome: Arc<OutcomeSlot>,
}

impl SessionGuard {
    pub(crate) fn new(
        teardown: Arc<Teardown>,
        events: UnboundedSender<SessionEvent>,
        cache: PagedImageCache,
    ) -> Self {
        Self {
            teardown,
            events,
            cache,
            outcome: Arc::new(OutcomeSlot::new()),
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.teardown.is_cancelled()
    }

    /// Append a page and announce it.
    pub(crate) fn append(&self, image: Arc<DecodedImage>) -> Result<usize, SessionError> {
        self.teardown
            .run_if_live(|| {
                let page = self.cache.append(image);
                self.send(SessionEvent::PageAppended { page });
                page
            })
            .ok_or(SessionError::Cancelled)
    }

    /// Send `event` unless the session has been torn down.
    pub(crate) fn emit(&self, event: SessionEvent) -> bool {
        let sent = self.teardown.run_if_live(|| self.send(event));
        if sent.is_none() {
            log::warn!("Suppressed session event after teardown");
        }
        sent.unwrap_or(false)
    }

    /// Dispatch the recognition outcome, at most once per session.
    pub(crate) fn dispatch_outcome(&self, outcome: RecognitionOutcome) -> bool {
        let dispatched = self.teardown.run_if_live(|| {
            if !self.outcome.resolve(outcome.clone()) {
                log::warn!("Recognition outcome already dispatched, dropping duplicate");
                return false;
            }
            self.send(SessionEvent::Recognized(outcome))
        });
        if dispatched.is_none() {
            log::warn!("Suppressed recognition outcome after teardown");
        }
        dispatched.unwrap_or(false)
    }

    fn send(&self, event: SessionEvent) -> bool {
        // A closed receiver means the presentation layer is gone
        self.events.send(event).is_ok()
    }
}
