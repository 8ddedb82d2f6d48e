//! `style="..."` declaration lists and their cache.
//!
//! [CSS Style Attributes § 2](https://www.w3.org/TR/css-style-attr/#syntax)
//!
//! "The value of the style attribute must match the syntax of the contents
//! of a CSS declaration block"
//!
//! Only the flat `name: value; ...` form is understood. Malformed
//! declarations are skipped one at a time.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use wombat_common::cache::{BoundedCache, CacheStats};

/// Default capacity of a [`DeclarationCache`].
pub const DEFAULT_DECLARATION_CACHE_CAPACITY: usize = 256;

/// Ordered `name: value` pairs. Names are lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CssDeclarations(Vec<(String, String)>);

impl CssDeclarations {
    /// Parse a declaration list.
    ///
    /// - Empty text has no declarations (`None`).
    /// - Whitespace-only text is a single empty declaration, `{"": ""}`.
    /// - Text without any `:` is not a declaration list (`None`).
    /// - Otherwise each `;`-separated part splits on its first `:`; parts
    ///   with an empty name or value are skipped. No surviving part means
    ///   `None`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        if text.trim().is_empty() {
            return Some(Self(vec![(String::new(), String::new())]));
        }
        if !text.contains(':') {
            return None;
        }
        let declarations: Vec<(String, String)> = text
            .split(';')
            .filter_map(|part| {
                let (name, value) = part.split_once(':')?;
                let name = name.trim();
                let value = value.trim();
                (!name.is_empty() && !value.is_empty())
                    .then(|| (name.to_ascii_lowercase(), value.to_string()))
            })
            .collect();
        (!declarations.is_empty()).then_some(Self(declarations))
    }

    /// Value of `name`. A later declaration of the same name wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate declarations in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Bounded LRU of parsed declaration lists keyed by the source text.
///
/// Unparseable text is cached as `None` too, so a bad `style` attribute
/// repeated across a document is only parsed once.
pub struct DeclarationCache {
    entries: BoundedCache<String, Option<Arc<CssDeclarations>>>,
    parses: AtomicU64,
}

impl Default for DeclarationCache {
    fn default() -> Self {
        Self::new(DEFAULT_DECLARATION_CACHE_CAPACITY)
    }
}

impl DeclarationCache {
    /// Create a cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: BoundedCache::new(capacity),
            parses: AtomicU64::new(0),
        }
    }

    /// Parsed declarations for `text`, from the cache when possible.
    pub fn get(&self, text: &str) -> Option<Arc<CssDeclarations>> {
        if let Some(cached) = self.entries.get(&text.to_string()) {
            return cached;
        }
        let _ = self.parses.fetch_add(1, Ordering::Relaxed);
        let parsed = CssDeclarations::parse(text).map(Arc::new);
        self.entries.insert(text.to_string(), parsed.clone());
        parsed
    }

    /// Number of times text was actually parsed.
    #[must_use]
    pub fn parse_count(&self) -> u64 {
        self.parses.load(Ordering::Relaxed)
    }

    /// Lookup counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        self.entries.clear();
        self.parses.store(0, Ordering::Relaxed);
    }
}
