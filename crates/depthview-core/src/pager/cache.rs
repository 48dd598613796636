//! Append-only store of decoded pages.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::decode::DecodedImage;

/// Ordered, append-only collection of decoded images backing a pager.
///
/// Clones share the same storage: the pipeline holds one handle and appends,
/// the viewer holds others and reads. Pages are numbered from 1 in insertion
/// order and are never removed.
#[derive(Debug, Clone, Default)]
pub struct PagedImageCache {
    pages: Arc<RwLock<Vec<Arc<DecodedImage>>>>,
}

impl PagedImageCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `image` as the last page and return its page number.
    pub fn append(&self, image: impl Into<Arc<DecodedImage>>) -> usize {
        let mut pages = self.write();
        pages.push(image.into());
        pages.len()
    }

    /// Get page `n` (1-indexed), or `None` if it does not exist yet.
    pub fn page(&self, n: usize) -> Option<Arc<DecodedImage>> {
        let index = n.checked_sub(1)?;
        self.read().get(index).cloned()
    }

    /// Number of pages appended so far.
    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Check if no page has been appended.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Snapshot of all pages in order.
    pub fn snapshot(&self) -> Vec<Arc<DecodedImage>> {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<DecodedImage>>> {
        self.pages.read().unwrap_or_else(|e| {
            log::warn!("Page cache lock poisoned, continuing with recovered data");
            PoisonError::into_inner(e)
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<DecodedImage>>> {
        self.pages.write().unwrap_or_else(|e| {
            log::warn!("Page cache lock poisoned, continuing with recovered data");
            PoisonError::into_inner(e)
        })
    }
}
