//! Asynchronous viewing sessions.
//!
//! A session loads one container, decodes and corrects the primary image,
//! appends pages to a [`PagedImageCache`](crate::pager::PagedImageCache) in
//! container order and runs recognition on the primary image. Results reach
//! the interactive thread as [`SessionEvent`]s over a channel it owns.
//!
//! ```text
//! load -> scan -> decode primary -> correct -> append page 1
//!                                      |
//!                                      +-> recognize (own task) -> Recognized
//!                 decode secondaries -> append pages 2..n
//! ```
//!
//! Dropping or cancelling the [`SessionHandle`] tears the session down: no
//! page is appended and no event is sent afterwards.

mod guard;
mod pipeline;
mod types;

pub use pipeline::{SessionHandle, ViewingSession};
pub use types::{SessionError, SessionEvent, SessionParams};
