//! Deduplicated warnings.
//!
//! Used by the selector and animation engines to report behaviour that is
//! accepted but probably unintended (an unknown animated property, a
//! negative-step `nth-child`). Each distinct message is emitted once.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a questionable input (emits once per unique message).
///
/// The warning is sent to `tracing` at `WARN` level with the component
/// recorded as a field, so subscribers can filter on it.
///
/// # Example
/// ```ignore
/// warn_once("anim", "unknown property 'cx', animating as attribute");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_emit {
        tracing::warn!(component, "{message}");
    }
}

/// Returns true if `warn_once` has already emitted this message.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.contains(&key))
}

/// Forget every recorded warning so they may be emitted again.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_records_until_cleared() {
        warn_once("test", "first notice");
        assert!(was_warned("test", "first notice"));
        assert!(!was_warned("test", "never sent"));

        clear_warnings();
        assert!(!was_warned("test", "first notice"));
    }
}
