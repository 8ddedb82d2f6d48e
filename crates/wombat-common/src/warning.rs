//! Renderer warnings routed through the `log` facade.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the HTML, CSS and layout components to report unsupported input
//! (unknown units, unknown colors, malformed declarations).

use std::collections::HashSet;

use parking_lot::Mutex;

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about unsupported input (emitted once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("CSS", "unsupported unit 'vmin' in font-size: 2vmin");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED.lock().get_or_insert_with(HashSet::new).insert(key);

    if should_emit {
        log::warn!(target: "wombat", "[{component}] {message}");
    }
}

/// Whether a warning with this component and message was already emitted.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED.lock().as_ref().is_some_and(|set| set.contains(&key))
}

/// Clear all recorded warnings (call when starting a new render session)
pub fn clear_warnings() {
    if let Some(set) = WARNED.lock().as_mut() {
        set.clear();
    }
}
