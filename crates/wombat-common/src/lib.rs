//! Common utilities for the Wombat renderer.
//!
//! This crate provides shared infrastructure used by all renderer components:
//! - **Warning System** - deduplicated warnings for unsupported features
//! - **Debug Log** - session-scoped, append-only event log for the layout engine
//! - **Whitespace** - ASCII whitespace helpers used by the parser and ruby merge
//! - **Caches** - bounded LRU and cost-bounded caches with hit/miss counters

pub mod cache;
pub mod debug_log;
pub mod warning;
pub mod whitespace;
