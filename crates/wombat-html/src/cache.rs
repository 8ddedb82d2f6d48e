//! Parsed-document cache.
//!
//! Re-rendering the same markup (a resize, a re-open of the same screen) is
//! common, and parsing dominates small documents. Entries are keyed by the
//! markup itself, so two documents never share an entry, and values are
//! shared `Arc`s.

use std::sync::Arc;

use wombat_common::cache::{BoundedCache, CacheStats};
use wombat_dom::ParsedNode;

use crate::{minify, parse};

/// Default number of cached documents.
pub const DEFAULT_PARSE_CACHE_CAPACITY: usize = 64;

/// Bounded LRU of parsed documents.
pub struct ParseCache {
    entries: BoundedCache<(String, bool), Arc<ParsedNode>>,
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(DEFAULT_PARSE_CACHE_CAPACITY)
    }
}

impl ParseCache {
    /// Create a cache holding at most `capacity` documents.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: BoundedCache::new(capacity),
        }
    }

    /// Parse `html`, minifying it first when `minify_first` is set, or return
    /// the cached tree.
    pub fn parse(&self, html: &str, minify_first: bool) -> Arc<ParsedNode> {
        let key = (html.to_string(), minify_first);
        self.entries.get_or_insert_with(key, || {
            log::trace!(target: "wombat::html", "parse cache miss ({} bytes)", html.len());
            let root = if minify_first {
                parse(&minify(html))
            } else {
                parse(html)
            };
            Arc::new(root)
        })
    }

    /// Lookup counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }

    /// Number of cached documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached document.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
