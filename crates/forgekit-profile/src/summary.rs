//! Immutable resource-usage summary produced once per command.
//!
//! All durations are milliseconds rounded to two decimal places; all
//! memory figures are megabytes. The structure is flat and fully
//! enumerable, suitable for direct machine consumption when a command
//! runs in metrics mode.

use serde::{Deserialize, Serialize};

/// Process CPU time consumed between construction and finish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuTimes {
    /// User-mode CPU milliseconds.
    pub user_ms: f64,
    /// Kernel-mode CPU milliseconds.
    pub system_ms: f64,
}

/// Resident-set snapshots around the command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    /// RSS at profiler construction, in MB.
    pub start_mb: f64,
    /// Highest RSS observed via opportunistic sampling, in MB.
    pub peak_mb: f64,
    /// RSS at finish, in MB.
    pub end_mb: f64,
}

/// Event-loop (scheduler) delay percentiles, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventLoopStats {
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    pub max: f64,
}

/// Block I/O deltas between construction and finish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IoCounters {
    /// Filesystem read operations.
    pub reads: u64,
    /// Filesystem write operations.
    pub writes: u64,
    /// Bytes read (block-sized accounting).
    pub bytes_read: u64,
    /// Bytes written (block-sized accounting).
    pub bytes_written: u64,
}

/// One observed collector pause. Preserved individually here; the human
/// formatter rolls these up per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcEvent {
    /// Pause kind as reported by the runtime.
    pub kind: String,
    /// Pause duration in milliseconds.
    pub duration_ms: f64,
}

/// A named sub-timer within the command, relative to profiler start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTiming {
    pub name: String,
    /// Offset from profiler start, in milliseconds.
    pub start_ms: f64,
    /// Offset at which the step ended. Absent for unclosed steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_ms: Option<f64>,
    /// Derived duration. Absent for unclosed steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

/// The immutable record of resource usage collected around one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Command name the profiler was constructed with.
    pub command: String,
    /// Whether the command finished successfully.
    pub ok: bool,
    /// Wall-clock duration in milliseconds.
    pub wall_ms: f64,
    pub cpu: CpuTimes,
    pub memory: MemoryUsage,
    /// Present only when the lag sampler ran and collected samples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_loop: Option<EventLoopStats>,
    pub io: IoCounters,
    /// Individual collector pauses, empty when the runtime exposes none.
    pub gc: Vec<GcEvent>,
    /// Named sub-timers in creation order.
    pub steps: Vec<StepTiming>,
    /// Failure message captured at finish, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
