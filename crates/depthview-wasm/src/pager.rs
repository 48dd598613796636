//! Paged image cache bindings.

use depthview_core::pager::{PagedImageCache, PreRenderWindow, DEFAULT_PRE_RENDER_RADIUS};
use wasm_bindgen::prelude::*;

use crate::types::JsDecodedImage;

/// Append-only page store with a pre-render window.
///
/// Pages are numbered from 1 in insertion order.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const cache = new JsPageCache();
/// cache.append(decode_sub_image(bytes, 0, 1024));
/// for (const n of cache.window(1)) draw(n, cache.page(n));
/// ```
#[wasm_bindgen]
pub struct JsPageCache {
    cache: PagedImageCache,
    window: PreRenderWindow,
}

#[wasm_bindgen]
impl JsPageCache {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsPageCache {
        Self::with_radius(DEFAULT_PRE_RENDER_RADIUS)
    }

    /// Create a cache that keeps `radius` pages materialized around the current one.
    pub fn with_radius(radius: usize) -> JsPageCache {
        JsPageCache {
            cache: PagedImageCache::new(),
            window: PreRenderWindow::new(radius),
        }
    }

    /// Append an image and return its page number.
    pub fn append(&self, image: &JsDecodedImage) -> usize {
        self.cache.append(image.to_decoded())
    }

    /// Get page `n` (1-indexed), or `undefined` if it does not exist.
    pub fn page(&self, n: usize) -> Option<JsDecodedImage> {
        self.cache
            .page(n)
            .map(|image| JsDecodedImage::from_decoded((*image).clone()))
    }

    #[wasm_bindgen(getter)]
    pub fn count(&self) -> usize {
        self.cache.count()
    }

    /// Pages to keep materialized while `current` is shown.
    pub fn window(&self, current: usize) -> Vec<usize> {
        self.window
            .span(current, self.cache.count())
            .map(|span| span.collect())
            .unwrap_or_default()
    }
}

impl Default for JsPageCache {
    fn default() -> Self {
        Self::new()
    }
}
