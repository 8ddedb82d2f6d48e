//! Cache of rasterized attachment images.
//!
//! Rasterizing an attachment (a ruby's base and annotation glyphs) is the
//! most expensive step of a re-render, and the same attachment at the same
//! size and font renders to the same pixels. Entries are bounded both by
//! count and by total bytes; the least recently used entries are evicted
//! until both limits hold.

use std::sync::Arc;

use serde::Serialize;
use wombat_common::cache::{CacheStats, CostBoundedCache};
use wombat_css::{RenderConfig, Size};

/// Default maximum number of cached images.
pub const DEFAULT_IMAGE_COUNT_LIMIT: usize = 512;

/// Default maximum total bytes of cached images (8 MiB).
pub const DEFAULT_IMAGE_COST_LIMIT: usize = 8 * 1024 * 1024;

/// Bytes per RGBA pixel.
const BYTES_PER_PIXEL: usize = 4;

/// An RGBA8 bitmap with straight alpha.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA bytes.
    #[serde(skip)]
    pub pixels: Vec<u8>,
}

impl AttachmentImage {
    /// A fully transparent image.
    #[must_use]
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    /// Cache cost: width × height × 4.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    /// The RGBA value at (`x`, `y`), if inside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let bytes = self.pixels.get(start..start + BYTES_PER_PIXEL)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Whether any pixel has non-zero alpha.
    #[must_use]
    pub fn has_ink(&self) -> bool {
        self.pixels.chunks_exact(BYTES_PER_PIXEL).any(|px| px[3] > 0)
    }
}

/// Identity of a rasterized image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentImageKey {
    /// Hash of the attachment's tag, attributes and style.
    pub content_hash: u64,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Font family the image was drawn with.
    pub font_name: String,
    /// Bits of the base font size.
    pub font_size_bits: u32,
}

impl AttachmentImageKey {
    /// Key for an attachment drawn at `size` with the given font.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(content_hash: u64, size: Size, font_name: &str, font_size: f32) -> Self {
        Self {
            content_hash,
            width: size.width.max(0.0).ceil() as u32,
            height: size.height.max(0.0).ceil() as u32,
            font_name: font_name.to_string(),
            font_size_bits: font_size.to_bits(),
        }
    }
}

/// Count- and byte-bounded LRU of [`AttachmentImage`]s.
pub struct AttachmentImageCache {
    entries: CostBoundedCache<AttachmentImageKey, Arc<AttachmentImage>>,
}

impl Default for AttachmentImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_COUNT_LIMIT, DEFAULT_IMAGE_COST_LIMIT)
    }
}

impl AttachmentImageCache {
    /// Create a cache with the given limits.
    #[must_use]
    pub fn new(count_limit: usize, cost_limit: usize) -> Self {
        Self {
            entries: CostBoundedCache::new(count_limit, cost_limit),
        }
    }

    /// Create a cache with the limits of `config`.
    #[must_use]
    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.image_cache_count_limit, config.image_cache_cost_limit)
    }

    /// The cached image for `key`.
    #[must_use]
    pub fn get(&self, key: &AttachmentImageKey) -> Option<Arc<AttachmentImage>> {
        self.entries.get(key)
    }

    /// Cache `image`. Returns `false` when the image alone exceeds the byte
    /// limit and was not stored.
    pub fn insert(&self, key: AttachmentImageKey, image: Arc<AttachmentImage>) -> bool {
        let cost = image.byte_len();
        self.entries.insert(key, image, cost)
    }

    /// The cached image for `key`, rendering and caching it on a miss.
    pub fn get_or_render<F>(&self, key: AttachmentImageKey, render: F) -> Arc<AttachmentImage>
    where
        F: FnOnce() -> AttachmentImage,
    {
        if let Some(image) = self.entries.get(&key) {
            return image;
        }
        let image = Arc::new(render());
        if !self.insert(key, Arc::clone(&image)) {
            log::debug!(
                target: "wombat::images",
                "{}x{} image exceeds the cache byte limit",
                image.width,
                image.height
            );
        }
        image
    }

    /// Lookup and eviction counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }

    /// Number of cached images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total bytes held.
    #[must_use]
    pub fn total_cost(&self) -> usize {
        self.entries.total_cost()
    }

    /// Drop every image.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
