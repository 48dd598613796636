//! Pre-render window and the paging driver.
//!
//! The viewer keeps the current page plus `radius` pages on each side
//! materialized. Materializing a page is delegated to a [`PageRenderer`], so
//! each widget type supplies its own rendering without the pager inspecting
//! item types at runtime.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use super::PagedImageCache;
use crate::decode::DecodedImage;

/// Default number of pages kept materialized on each side of the current page.
pub const DEFAULT_PRE_RENDER_RADIUS: usize = 2;

/// Number of pages kept materialized around the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreRenderWindow {
    /// Pages kept on each side of the current page.
    pub radius: usize,
}

impl Default for PreRenderWindow {
    fn default() -> Self {
        Self {
            radius: DEFAULT_PRE_RENDER_RADIUS,
        }
    }
}

impl PreRenderWindow {
    /// Create a window with the given radius.
    pub fn new(radius: usize) -> Self {
        Self { radius }
    }

    /// Pages (1-indexed, inclusive) to keep materialized around `current`.
    ///
    /// Returns `None` when there are no pages. `current` is clamped into
    /// `1..=count`.
    pub fn span(&self, current: usize, count: usize) -> Option<RangeInclusive<usize>> {
        if count == 0 {
            return None;
        }
        let current = current.clamp(1, count);
        let first = current.saturating_sub(self.radius).max(1);
        let last = current.saturating_add(self.radius).min(count);
        Some(first..=last)
    }
}

/// A widget that can show and drop a page.
pub trait PageRenderer {
    /// Materialize `page` showing `image`.
    fn render(&mut self, page: usize, image: &DecodedImage);

    /// Drop whatever was materialized for `page`.
    fn release(&mut self, page: usize);
}

/// Drives a [`PageRenderer`] from a [`PagedImageCache`] and a [`PreRenderWindow`].
#[derive(Debug)]
pub struct Pager<R> {
    cache: PagedImageCache,
    window: PreRenderWindow,
    renderer: R,
    current: usize,
    materialized: BTreeSet<usize>,
}

impl<R: PageRenderer> Pager<R> {
    /// Create a pager positioned on page 1. Nothing is rendered until
    /// [`Pager::show`] or [`Pager::refresh`] is called.
    pub fn new(cache: PagedImageCache, window: PreRenderWindow, renderer: R) -> Self {
        Self {
            cache,
            window,
            renderer,
            current: 1,
            materialized: BTreeSet::new(),
        }
    }

    /// Move to `page` and update the materialized set.
    ///
    /// Returns the page actually shown after clamping, or `None` if the cache
    /// is empty.
    pub fn show(&mut self, page: usize) -> Option<usize> {
        let count = self.cache.count();
        if count == 0 {
            return None;
        }
        self.current = page.clamp(1, count);
        self.sync(count);
        Some(self.current)
    }

    /// Re-evaluate the window, picking up pages appended since the last call.
    pub fn refresh(&mut self) {
        let count = self.cache.count();
        if count > 0 {
            self.current = self.current.clamp(1, count);
            self.sync(count);
        }
    }

    /// The current page number.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Pages currently materialized, in ascending order.
    pub fn materialized(&self) -> impl Iterator<Item = usize> + '_ {
        self.materialized.iter().copied()
    }

    /// Access the renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn sync(&mut self, count: usize) {
        let Some(span) = self.window.span(self.current, count) else {
            return;
        };

        let stale: Vec<usize> = self
            .materialized
            .iter()
            .copied()
            .filter(|page| !span.contains(page))
            .collect();
        for page in stale {
            self.renderer.release(page);
            self.materialized.remove(&page);
        }

        for page in span {
            if self.materialized.contains(&page) {
                continue;
            }
            if let Some(image) = self.cache.page(page) {
                self.renderer.render(page, &image);
                self.materialized.insert(page);
            }
        }
    }
}
