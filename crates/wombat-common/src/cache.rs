//! Bounded caches shared across a render session.
//!
//! Two flavors:
//! - [`BoundedCache`]: a count-limited LRU, used for parsed `style="..."`
//!   declarations and parsed documents.
//! - [`CostBoundedCache`]: an LRU limited by both entry count and total cost,
//!   used for rasterized attachment images where the cost is the byte size.
//!
//! Both are safe for concurrent reads and inserts. Every lookup updates the
//! hit/miss counters returned by `stats()`.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;

/// Lookup counters for a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries dropped to respect the limits.
    pub evictions: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl Counters {
    fn hit(&self) {
        let _ = self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn miss(&self) {
        let _ = self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn evicted(&self, count: u64) {
        let _ = self.evictions.fetch_add(count, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }
}

fn non_zero(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}

/// Count-limited LRU cache.
///
/// Values are cloned out on lookup, so store `Arc`s for anything large.
#[derive(Debug)]
pub struct BoundedCache<K: Hash + Eq, V> {
    entries: Mutex<LruCache<K, V, FxBuildHasher>>,
    counters: Counters,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(LruCache::with_hasher(
                non_zero(capacity),
                FxBuildHasher::default(),
            )),
            counters: Counters::default(),
        }
    }

    /// Look up `key`, marking it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let hit = self.entries.lock().get(key).cloned();
        if hit.is_some() {
            self.counters.hit();
        } else {
            self.counters.miss();
        }
        hit
    }

    /// Insert or replace `key`, evicting the least recently used entry if
    /// the cache is full.
    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock();
        let full = entries.len() == entries.cap().get() && !entries.contains(&key);
        let _ = entries.put(key, value);
        if full {
            self.counters.evicted(1);
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs without the lock held.
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Lookup counters since creation or the last [`Self::clear`].
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        self.entries.lock().clear();
        self.counters.reset();
    }
}

struct CostedEntries<K: Hash + Eq, V> {
    entries: LruCache<K, (V, usize), FxBuildHasher>,
    total_cost: usize,
}

/// LRU cache limited by entry count and by the sum of entry costs.
///
/// Inserting evicts least recently used entries until both limits hold.
/// An entry whose own cost exceeds the cost limit is not stored.
pub struct CostBoundedCache<K: Hash + Eq, V> {
    count_limit: usize,
    cost_limit: usize,
    inner: Mutex<CostedEntries<K, V>>,
    counters: Counters,
}

impl<K: Hash + Eq, V: Clone> CostBoundedCache<K, V> {
    /// Create a cache bounded by `count_limit` entries and `cost_limit` total cost.
    #[must_use]
    pub fn new(count_limit: usize, cost_limit: usize) -> Self {
        Self {
            count_limit: count_limit.max(1),
            cost_limit,
            inner: Mutex::new(CostedEntries {
                entries: LruCache::unbounded_with_hasher(FxBuildHasher::default()),
                total_cost: 0,
            }),
            counters: Counters::default(),
        }
    }

    /// Look up `key`, marking it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let hit = self.inner.lock().entries.get(key).map(|(v, _)| v.clone());
        if hit.is_some() {
            self.counters.hit();
        } else {
            self.counters.miss();
        }
        hit
    }

    /// Insert `value` with the given cost.
    ///
    /// Returns `false` when the value alone exceeds the cost limit.
    pub fn insert(&self, key: K, value: V, cost: usize) -> bool {
        if cost > self.cost_limit {
            return false;
        }
        let mut inner = self.inner.lock();
        if let Some((_, old_cost)) = inner.entries.pop(&key) {
            inner.total_cost -= old_cost;
        }
        let mut evicted = 0;
        while inner.entries.len() >= self.count_limit
            || inner.total_cost + cost > self.cost_limit
        {
            match inner.entries.pop_lru() {
                Some((_, (_, dropped))) => {
                    inner.total_cost -= dropped;
                    evicted += 1;
                }
                None => break,
            }
        }
        let _ = inner.entries.put(key, (value, cost));
        inner.total_cost += cost;
        drop(inner);
        if evicted > 0 {
            self.counters.evicted(evicted);
        }
        true
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the costs of all cached entries.
    #[must_use]
    pub fn total_cost(&self) -> usize {
        self.inner.lock().total_cost
    }

    /// Lookup counters since creation or the last [`Self::clear`].
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.total_cost = 0;
        drop(inner);
        self.counters.reset();
    }
}
