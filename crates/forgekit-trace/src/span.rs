//! Core span type for ForgeKit execution traces.
//!
//! A [`Span`] is a named, timed unit of work. Spans nest via `parent_id`
//! and live on the owning chain's span stack until closed. Durations are
//! derived from a monotonic clock; the wall-clock timestamps exist only
//! for serialization and human display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

/// Round a millisecond figure to two decimal places.
pub(crate) fn round2(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

/// Generate a short span identifier, unique within a trace.
pub(crate) fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

fn monotonic_now() -> Instant {
    Instant::now()
}

/// A single timed unit of work within a trace.
///
/// Created by the span engine when work begins, mutated only by its own
/// close, and immutable afterward except for archival. `duration_ms` is
/// derived from the monotonic `start` on close and is never set
/// independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    /// Short identifier, unique within the trace.
    pub id: String,
    /// Identifier of the span that was active when this one was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Human-readable operation name.
    pub name: String,
    /// Wall-clock creation time, for serialization and sibling ordering.
    pub started_at: DateTime<Utc>,
    /// Monotonic creation instant, used for duration computation only.
    #[serde(skip, default = "monotonic_now")]
    pub(crate) start: Instant,
    /// Wall-clock close time. Present if and only if the span has closed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Elapsed milliseconds (2dp). Present if and only if `ended_at` is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    /// Open key-value annotations attached by the caller.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attrs: HashMap<String, serde_json::Value>,
}

impl Span {
    /// Create a new open span.
    pub(crate) fn new(
        name: &str,
        parent_id: Option<String>,
        attrs: Option<HashMap<String, serde_json::Value>>,
    ) -> Self {
        Self {
            id: short_id(),
            parent_id,
            name: name.to_string(),
            started_at: Utc::now(),
            start: Instant::now(),
            ended_at: None,
            duration_ms: None,
            attrs: attrs.unwrap_or_default(),
        }
    }

    /// Stamp the close time and derived duration. Idempotent.
    pub(crate) fn close(&mut self) {
        if self.ended_at.is_some() {
            return;
        }
        self.ended_at = Some(Utc::now());
        self.duration_ms = Some(round2(self.start.elapsed().as_secs_f64() * 1000.0));
    }

    /// Whether the span has been closed.
    pub fn is_closed(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Attach or overwrite an annotation on an open span.
    pub fn set_attr(&mut self, key: &str, value: serde_json::Value) {
        self.attrs.insert(key.to_string(), value);
    }
}
