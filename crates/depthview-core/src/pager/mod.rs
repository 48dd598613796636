//! Paged display of decoded images.
//!
//! [`PagedImageCache`] stores pages. [`Pager`] layers a fixed pre-render
//! window over it and drives a [`PageRenderer`] supplied by the widget.

mod cache;
mod window;

pub use cache::PagedImageCache;
pub use window::{PageRenderer, Pager, PreRenderWindow, DEFAULT_PRE_RENDER_RADIUS};
