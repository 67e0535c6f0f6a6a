//! Process-wide archive of completed spans, keyed by trace identity.
//!
//! This is the only cross-chain-visible state in the tracing layer. It
//! exists so a trace can be rendered as a tree after all of its spans have
//! closed and been popped from the live stack. Entries are created by the
//! archival step of span closure and must be cleared by the owner when the
//! trace's lifecycle ends; an uncleaned entry is a slow leak bounded by
//! the number of distinct traces in the process lifetime.

use crate::span::Span;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, MutexGuard};

static ARCHIVE: LazyLock<Mutex<HashMap<String, Vec<Span>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn store() -> MutexGuard<'static, HashMap<String, Vec<Span>>> {
    ARCHIVE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Append a completed span to the archive for `trace_id`.
pub fn archive_span(trace_id: &str, span: Span) {
    store().entry(trace_id.to_string()).or_default().push(span);
}

/// Clone the archived spans for `trace_id` without consuming them.
pub fn snapshot(trace_id: &str) -> Vec<Span> {
    store().get(trace_id).cloned().unwrap_or_default()
}

/// Remove and return the archived spans for `trace_id`.
pub fn take(trace_id: &str) -> Vec<Span> {
    store().remove(trace_id).unwrap_or_default()
}

/// Drop the archive entry for `trace_id`, if any.
pub fn clear(trace_id: &str) {
    store().remove(trace_id);
}

/// Number of traces currently held in the archive.
pub fn trace_count() -> usize {
    store().len()
}
