//! Execution tracing for ForgeKit command invocations.
//!
//! This crate provides the trace context that rides along asynchronous
//! continuations without explicit parameter threading, the span engine
//! built on top of it, a process-wide archive of completed spans, and a
//! pure formatter that renders an archived trace as an indented tree.
//!
//! # Trace anatomy
//!
//! ```text
//! command (trace 4f2a91c0…)
//!   └─ load templates (12.40ms)
//!   └─ write files (88.12ms)
//!       └─ render component (31.07ms)
//! ```
//!
//! # Usage
//!
//! 1. Establish a chain with [`context::scope`] (the orchestrator does this
//!    once per invocation; tests may open several concurrent scopes).
//! 2. Create spans with [`engine::start_span`] / [`engine::end_span`], or
//!    let [`engine::with_span`] manage the lifecycle.
//! 3. Use [`engine::with_span_tracked`] for spans that should survive into
//!    the archive for later tree rendering.
//! 4. When the trace is finished, render with [`tree::format_trace_tree`]
//!    and release the archive entry with [`archive::clear`].

pub mod archive;
pub mod context;
pub mod engine;
pub mod span;
pub mod tree;

pub use context::{
    active_span_id, current, new_scope_context, new_trace_id, scope, set_trace_id, trace_id,
    ContextHandle, TraceContext,
};
pub use engine::{end_span, start_span, with_span, with_span_tracked};
pub use span::Span;
pub use tree::format_trace_tree;
