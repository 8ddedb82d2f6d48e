//! Render configuration.
//!
//! Loaded from JSON by the command-line front end. Every field has a
//! default, so a partial file only overrides what it names.

use std::hash::{Hash, Hasher};
use std::time::Duration;

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// Default ratio of ruby annotation size to base text size.
pub const DEFAULT_RUBY_SCALE: f32 = 0.58;

/// Tunables for a render session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Collapse adjacent vertical margins between block children.
    pub collapse_block_margins: bool,
    /// Quiet period, in milliseconds, before a burst of size reports is
    /// measured.
    pub debounce_ms: u64,
    /// Capacity of the `style="..."` declaration cache.
    pub declaration_cache_capacity: usize,
    /// Capacity of the parsed-document cache.
    pub parse_cache_capacity: usize,
    /// Maximum number of rasterized attachment images.
    pub image_cache_count_limit: usize,
    /// Maximum total bytes of rasterized attachment images.
    pub image_cache_cost_limit: usize,
    /// Ruby annotation font size as a fraction of the base font size.
    pub ruby_scale: f32,
    /// Minify markup before parsing.
    pub minify: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            collapse_block_margins: true,
            debounce_ms: 16,
            declaration_cache_capacity: 256,
            parse_cache_capacity: 64,
            image_cache_count_limit: 512,
            image_cache_cost_limit: 8 * 1024 * 1024,
            ruby_scale: DEFAULT_RUBY_SCALE,
            minify: true,
        }
    }
}

impl RenderConfig {
    /// Debounce window as a [`Duration`].
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Hash of every field, for memo keys that depend on configuration.
    #[must_use]
    pub fn cache_key(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.collapse_block_margins.hash(&mut hasher);
        self.debounce_ms.hash(&mut hasher);
        self.declaration_cache_capacity.hash(&mut hasher);
        self.parse_cache_capacity.hash(&mut hasher);
        self.image_cache_count_limit.hash(&mut hasher);
        self.image_cache_cost_limit.hash(&mut hasher);
        self.ruby_scale.to_bits().hash(&mut hasher);
        self.minify.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_tracks_fields() {
        let base = RenderConfig::default();
        let other = RenderConfig {
            ruby_scale: 0.5,
            ..RenderConfig::default()
        };
        assert_eq!(base.cache_key(), RenderConfig::default().cache_key());
        assert_ne!(base.cache_key(), other.cache_key());
    }
}
