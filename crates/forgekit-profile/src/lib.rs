//! Resource profiling for ForgeKit command invocations.
//!
//! A [`Profiler`] is constructed once per command, samples process
//! resource usage around the command's execution, and produces an
//! immutable [`ProfileSummary`] on [`Profiler::finish`]. Platform
//! instrumentation (CPU accounting, RSS snapshots, event-loop lag
//! sampling, collector pause observation) is capability-checked: when a
//! probe cannot be acquired the profiler degrades to a reduced-feature
//! summary and never fails the wrapped command.

pub mod format;
mod probes;
pub mod profiler;
mod sampler;
pub mod summary;

pub use format::render_profile;
pub use profiler::{Profiler, StepHandle};
pub use summary::{
    CpuTimes, EventLoopStats, GcEvent, IoCounters, MemoryUsage, ProfileSummary, StepTiming,
};
