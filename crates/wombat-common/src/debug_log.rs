//! Session-scoped debug log for the attachment layout pipeline.
//!
//! The log is append-only and tolerates concurrent writers through a single
//! mutex. Every entry is also forwarded to `log::trace!` under the
//! `wombat::debug` target, so `RUST_LOG=wombat::debug=trace` mirrors the
//! buffer on stderr.
//!
//! A disabled log ([`DebugLog::disabled`]) skips all formatting and locking,
//! which is what production sessions use.

use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugEntry {
    /// Time since the log was created.
    pub elapsed: Duration,
    /// Short subsystem tag, e.g. `"engine"` or `"measure"`.
    pub category: String,
    /// Rendered message.
    pub message: String,
}

impl fmt::Display for DebugEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>8.3}ms] [{}] {}",
            self.elapsed.as_secs_f64() * 1000.0,
            self.category,
            self.message
        )
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<DebugEntry>,
    once_keys: HashSet<String>,
}

/// Append-only event sink shared by one render session.
#[derive(Debug)]
pub struct DebugLog {
    enabled: bool,
    started: Instant,
    inner: Mutex<Inner>,
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugLog {
    /// Create an enabled, empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: true,
            started: Instant::now(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Create a log that drops every record.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Whether records are kept.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append a message.
    ///
    /// The message is built lazily so a disabled log pays nothing for it.
    pub fn record<F, S>(&self, category: &str, message: F)
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        if !self.enabled {
            return;
        }
        let entry = self.entry(category, message().into());
        log::trace!(target: "wombat::debug", "[{category}] {}", entry.message);
        self.inner.lock().entries.push(entry);
    }

    /// Append a message only the first time `key` is seen.
    ///
    /// Returns `true` when the message was recorded.
    pub fn record_once<F, S>(&self, key: &str, category: &str, message: F) -> bool
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        if !self.enabled {
            return false;
        }
        let mut inner = self.inner.lock();
        if !inner.once_keys.insert(key.to_string()) {
            return false;
        }
        let entry = self.entry(category, message().into());
        log::trace!(target: "wombat::debug", "[{category}] {}", entry.message);
        inner.entries.push(entry);
        true
    }

    /// Snapshot of all entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<DebugEntry> {
        self.inner.lock().entries.clone()
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render every entry, one per line.
    #[must_use]
    pub fn dump(&self) -> String {
        let inner = self.inner.lock();
        let mut out = String::new();
        for (i, entry) in inner.entries.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&entry.to_string());
        }
        out
    }

    /// Drop all entries and forget `record_once` keys.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.once_keys.clear();
    }

    fn entry(&self, category: &str, message: String) -> DebugEntry {
        DebugEntry {
            elapsed: self.started.elapsed(),
            category: category.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_log_records_nothing() {
        let log = DebugLog::disabled();
        log.record("engine", || "ignored");
        assert!(!log.record_once("k", "engine", || "ignored"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_record_once_deduplicates_by_key() {
        let log = DebugLog::new();
        assert!(log.record_once("size:1", "engine", || "first"));
        assert!(!log.record_once("size:1", "engine", || "second"));
        assert_eq!(log.len(), 1);
        log.clear();
        assert!(log.record_once("size:1", "engine", || "again"));
    }
}
