//! Span engine: creation, nesting, and closing of spans on the current
//! chain's context.
//!
//! `end_span` locates its span by id anywhere in the stack rather than
//! insisting on strict stack discipline. Out-of-order closes are tolerated;
//! the ordering property is asserted in tests rather than enforced here.

use crate::archive;
use crate::context::{self, lock};
use crate::span::Span;
use std::collections::HashMap;
use std::future::Future;

/// Create a span on the current chain and push it onto the span stack.
///
/// The new span's parent is the currently active span, if any. When no
/// context exists yet one is created with a fresh trace identity; this
/// never fails for "no trace". Returns a snapshot of the open span to be
/// handed back to [`end_span`].
pub fn start_span(name: &str, attrs: Option<HashMap<String, serde_json::Value>>) -> Span {
    let handle = context::current();
    let mut ctx = lock(&handle);
    let parent_id = ctx.span_stack.last().map(|span| span.id.clone());
    let span = Span::new(name, parent_id, attrs);
    ctx.span_stack.push(span.clone());
    span
}

/// Close a span: remove it from the current stack (wherever it sits),
/// stamp its end time and derived duration, and return the closed span.
///
/// Returns `None` when the span is not on this chain's stack, e.g. it was
/// already closed or belongs to another chain.
pub fn end_span(span: &Span) -> Option<Span> {
    let handle = context::current();
    let mut ctx = lock(&handle);
    let Some(position) = ctx.span_stack.iter().position(|open| open.id == span.id) else {
        drop(ctx);
        tracing::debug!(span_id = %span.id, name = %span.name, "span not on current stack");
        return None;
    };
    let mut closed = ctx.span_stack.remove(position);
    drop(ctx);
    closed.close();
    Some(closed)
}

/// Run `fut` inside a span, closing the span on both the success and the
/// failure path. The span never leaks when the wrapped work fails.
pub async fn with_span<F, T>(
    name: &str,
    attrs: Option<HashMap<String, serde_json::Value>>,
    fut: F,
) -> T
where
    F: Future<Output = T>,
{
    let span = start_span(name, attrs);
    let out = fut.await;
    end_span(&span);
    out
}

/// Like [`with_span`], but additionally archives the closed span into the
/// process-wide store keyed by trace identity, so the trace can be
/// rendered as a tree after all spans have closed.
pub async fn with_span_tracked<F, T>(
    name: &str,
    attrs: Option<HashMap<String, serde_json::Value>>,
    fut: F,
) -> T
where
    F: Future<Output = T>,
{
    let span = start_span(name, attrs);
    let out = fut.await;
    if let Some(closed) = end_span(&span) {
        archive::archive_span(&context::trace_id(), closed);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{active_span_id, new_scope_context, scope, trace_id};

    #[tokio::test]
    async fn test_start_span_nests_under_active_span() {
        scope(new_scope_context(None), async {
            let parent = start_span("parent", None);
            let child = start_span("child", None);

            assert_eq!(child.parent_id.as_deref(), Some(parent.id.as_str()));
            assert_eq!(active_span_id(), Some(child.id.clone()));

            end_span(&child);
            end_span(&parent);
        })
        .await;
    }

    #[tokio::test]
    async fn test_root_span_has_no_parent() {
        scope(new_scope_context(None), async {
            let root = start_span("root", None);
            assert!(root.parent_id.is_none());
            end_span(&root);
        })
        .await;
    }

    #[test]
    fn test_start_span_without_context_creates_one() {
        // No scope: the engine lazily creates a context rather than failing.
        let span = start_span("orphan", None);
        assert!(!trace_id().is_empty());
        end_span(&span);
    }

    #[tokio::test]
    async fn test_end_span_stamps_duration() {
        scope(new_scope_context(None), async {
            let span = start_span("timed", None);
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            let closed = end_span(&span).expect("span is on the stack");

            assert!(closed.is_closed());
            assert!(closed.duration_ms.unwrap() >= 0.0);
            assert_eq!(closed.duration_ms.is_some(), closed.ended_at.is_some());
        })
        .await;
    }

    #[tokio::test]
    async fn test_end_span_tolerates_out_of_order_close() {
        scope(new_scope_context(None), async {
            let outer = start_span("outer", None);
            let inner = start_span("inner", None);

            // Close the outer span first; it is not top of stack.
            let closed_outer = end_span(&outer).expect("found by id");
            assert!(closed_outer.is_closed());

            let closed_inner = end_span(&inner).expect("still on the stack");
            assert!(closed_inner.is_closed());
            assert!(active_span_id().is_none());
        })
        .await;
    }

    #[tokio::test]
    async fn test_end_span_twice_returns_none() {
        scope(new_scope_context(None), async {
            let span = start_span("once", None);
            assert!(end_span(&span).is_some());
            assert!(end_span(&span).is_none());
        })
        .await;
    }

    #[tokio::test]
    async fn test_with_span_closes_on_success() {
        scope(new_scope_context(None), async {
            let value = with_span("ok-path", None, async { 42 }).await;
            assert_eq!(value, 42);
            assert!(active_span_id().is_none());
        })
        .await;
    }

    #[tokio::test]
    async fn test_with_span_closes_on_failure() {
        scope(new_scope_context(None), async {
            let result: Result<(), String> = with_span("err-path", None, async {
                tokio::task::yield_now().await;
                Err("boom".to_string())
            })
            .await;

            assert!(result.is_err());
            // The span was popped despite the failure.
            assert!(active_span_id().is_none());
        })
        .await;
    }

    #[tokio::test]
    async fn test_with_span_tracked_archives_closed_span() {
        scope(new_scope_context(Some("tracked-trace")), async {
            let result: Result<(), String> = with_span_tracked("failing-step", None, async {
                tokio::task::yield_now().await;
                Err("boom".to_string())
            })
            .await;
            assert!(result.is_err());

            // Archived as closed, with a duration, before the error
            // propagated out of the wrapper.
            let archived = archive::snapshot("tracked-trace");
            assert_eq!(archived.len(), 1);
            assert_eq!(archived[0].name, "failing-step");
            assert!(archived[0].is_closed());
            assert!(archived[0].duration_ms.is_some());

            archive::clear("tracked-trace");
        })
        .await;
    }
}
