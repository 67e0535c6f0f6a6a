//! Continuation-scoped trace context store.
//!
//! Each logical chain of asynchronous continuations owns one
//! [`TraceContext`]: a trace identity plus an ordered stack of open spans.
//! The context is carried in a `tokio::task_local!` slot, so every `.await`
//! descending from a [`scope`] call inherits it by reference while
//! concurrently running, unrelated chains never observe each other's
//! context. A thread-local slot serves callers that run outside any scope,
//! which keeps [`current`] infallible: every log line gets a non-empty
//! trace identity even if no command ever initialized one.

use crate::span::Span;
use std::cell::RefCell;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Per-chain trace state: a stable trace identity and the stack of
/// currently open spans (last element is the active span).
#[derive(Debug)]
pub struct TraceContext {
    /// Stable identity for the life of the chain.
    pub trace_id: String,
    /// Open spans, innermost last. Empty means "at the root".
    pub span_stack: Vec<Span>,
}

impl TraceContext {
    fn fresh(trace_id: Option<&str>) -> Self {
        Self {
            trace_id: trace_id.map(str::to_string).unwrap_or_else(new_trace_id),
            span_stack: Vec::new(),
        }
    }
}

/// Shared handle to a chain's context. The handle is cloned into spawned
/// continuations; the context itself is never copied across chains.
pub type ContextHandle = Arc<Mutex<TraceContext>>;

tokio::task_local! {
    static TRACE_CONTEXT: ContextHandle;
}

thread_local! {
    /// Fallback slot for callers outside any scope, created lazily.
    static UNSCOPED_CONTEXT: RefCell<Option<ContextHandle>> = const { RefCell::new(None) };
}

/// Generate a fresh trace identity.
pub fn new_trace_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Lock a context handle, tolerating poisoning: a panicking chain must not
/// take down unrelated instrumentation.
pub(crate) fn lock(handle: &ContextHandle) -> MutexGuard<'_, TraceContext> {
    handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Return the context active in the current continuation.
///
/// Inside a [`scope`] this is the scoped chain's context; outside, a
/// lazily created thread-local context with a fresh trace identity.
pub fn current() -> ContextHandle {
    if let Ok(handle) = TRACE_CONTEXT.try_with(Clone::clone) {
        return handle;
    }
    UNSCOPED_CONTEXT.with(|slot| {
        slot.borrow_mut()
            .get_or_insert_with(|| Arc::new(Mutex::new(TraceContext::fresh(None))))
            .clone()
    })
}

/// Build a fresh context handle for a new chain.
pub fn new_scope_context(trace_id: Option<&str>) -> ContextHandle {
    Arc::new(Mutex::new(TraceContext::fresh(trace_id)))
}

/// Run `fut` with `handle` as the current continuation's context.
///
/// Every asynchronous continuation descending from `fut` observes this
/// context; sibling scopes are fully isolated from one another.
pub async fn scope<F: Future>(handle: ContextHandle, fut: F) -> F::Output {
    TRACE_CONTEXT.scope(handle, fut).await
}

/// Overwrite the current context's trace identity and clear its span
/// stack, starting a new trace inside the same chain. A `None` identity
/// regenerates a fresh one.
pub fn set_trace_id(trace_id: Option<&str>) {
    let handle = current();
    let mut ctx = lock(&handle);
    ctx.trace_id = trace_id.map(str::to_string).unwrap_or_else(new_trace_id);
    ctx.span_stack.clear();
}

/// Trace identity of the current continuation. Never empty.
pub fn trace_id() -> String {
    let handle = current();
    let ctx = lock(&handle);
    ctx.trace_id.clone()
}

/// Identifier of the currently active span, if any.
pub fn active_span_id() -> Option<String> {
    let handle = current();
    let ctx = lock(&handle);
    ctx.span_stack.last().map(|span| span.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::start_span;

    #[test]
    fn test_trace_id_is_never_empty() {
        // No scope established; the fallback context must still carry an id.
        assert!(!trace_id().is_empty());
    }

    #[tokio::test]
    async fn test_scope_carries_context_across_awaits() {
        let handle = new_scope_context(Some("trace-scope-test"));
        scope(handle, async {
            assert_eq!(trace_id(), "trace-scope-test");
            tokio::task::yield_now().await;
            assert_eq!(trace_id(), "trace-scope-test");
        })
        .await;
    }

    #[tokio::test]
    async fn test_concurrent_chains_are_isolated() {
        let chain_a = scope(new_scope_context(Some("trace-a")), async {
            let _span = start_span("work-a", None);
            for _ in 0..10 {
                tokio::task::yield_now().await;
                assert_eq!(trace_id(), "trace-a");
                assert!(active_span_id().is_some());
            }
        });
        let chain_b = scope(new_scope_context(Some("trace-b")), async {
            for _ in 0..10 {
                tokio::task::yield_now().await;
                assert_eq!(trace_id(), "trace-b");
                // Chain A's open span must never show up here.
                assert!(active_span_id().is_none());
            }
        });
        tokio::join!(chain_a, chain_b);
    }

    #[tokio::test]
    async fn test_set_trace_id_clears_span_stack() {
        scope(new_scope_context(None), async {
            let _span = start_span("stale", None);
            assert!(active_span_id().is_some());

            set_trace_id(Some("restarted"));
            assert_eq!(trace_id(), "restarted");
            assert!(active_span_id().is_none());
        })
        .await;
    }

    #[tokio::test]
    async fn test_set_trace_id_none_regenerates() {
        scope(new_scope_context(Some("before")), async {
            set_trace_id(None);
            let id = trace_id();
            assert!(!id.is_empty());
            assert_ne!(id, "before");
        })
        .await;
    }
}
