//! The context module holds the diagnostic context of the current thread (commonly called MDC). The
//! context is a map of string keys to nullable string values that any log record emitted on this
//! thread is associated with. It is consulted by [Record](crate::record::Record) when an event is
//! captured, so formatters and appenders can read the entries as a map.
//!
//! The context is owned by the surrounding application code. Code that temporarily adds entries
//! should use [overlay] to guarantee that the prior state is reinstated afterward.

use std::cell::RefCell;
use std::collections::BTreeMap;

/// [ContextMap] is the owned representation of a diagnostic context.
pub type ContextMap = BTreeMap<String, Option<String>>;

thread_local! {
    static CONTEXT: RefCell<Option<ContextMap>> = const { RefCell::new(None) };
}

/// Returns a copy of the diagnostic context of the current thread. Returns [None] if no context
/// was set (or it was [cleared](clear)).
pub fn snapshot() -> Option<ContextMap> {
    CONTEXT.with_borrow(Clone::clone)
}

/// Returns the value for the key. The outer [Option] is [None] if the key is absent, the inner one
/// if the key is present with a null value.
pub fn get(key: &str) -> Option<Option<String>> {
    CONTEXT.with_borrow(|context| context.as_ref()?.get(key).cloned())
}

/// Puts a value for the key into the context, replacing any previous value. The context is created
/// if it is absent.
pub fn put(key: impl Into<String>, value: Option<String>) {
    CONTEXT.with_borrow_mut(|context| {
        context.get_or_insert_with(ContextMap::new).insert(key.into(), value);
    });
}

/// Removes the key from the context and returns its previous value.
pub fn remove(key: &str) -> Option<Option<String>> {
    CONTEXT.with_borrow_mut(|context| context.as_mut()?.remove(key))
}

/// Replaces the whole context with the provided map.
pub fn set_all(map: ContextMap) {
    CONTEXT.set(Some(map));
}

/// Removes the context entirely. A subsequent [snapshot] returns [None].
pub fn clear() {
    CONTEXT.set(None);
}

/// Overlays the entries onto the context and returns a [ContextGuard] that restores the context
/// that was present before the call once it is dropped. Existing entries with the same key are
/// overwritten while the guard is alive.
pub fn overlay<'a, I>(entries: I) -> ContextGuard
where
    I: IntoIterator<Item = (&'a String, &'a Option<String>)>,
{
    let guard = ContextGuard {
        previous: snapshot(),
    };
    CONTEXT.with_borrow_mut(|context| {
        let context = context.get_or_insert_with(ContextMap::new);
        for (key, value) in entries {
            context.insert(key.clone(), value.clone());
        }
    });
    guard
}

/// [ContextGuard] reinstates a captured diagnostic context when dropped. If no context was present
/// at capture time, the context is cleared instead. Dropping also happens while unwinding, so a
/// panicking subscriber cannot leak overlaid entries.
#[must_use = "the context is restored when the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    previous: Option<ContextMap>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(previous) => set_all(previous),
            None => clear(),
        }
    }
}
