//! The per-command profiler.
//!
//! Lifecycle: construct (baselines captured, samplers started when
//! profiling is enabled), zero or more [`Profiler::step`] calls, then one
//! [`Profiler::finish`] that tears down samplers and produces the
//! immutable [`ProfileSummary`]. A profiler is owned by exactly one
//! command invocation and is never reused.

use crate::probes::{self, PauseObserver, ResourceSample, IO_BLOCK_BYTES};
use crate::sampler::LoopLagSampler;
use crate::summary::{CpuTimes, IoCounters, MemoryUsage, ProfileSummary, StepTiming};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

fn round2(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

struct Inner {
    command: String,
    wall_start: Instant,
    cpu_start: Option<ResourceSample>,
    mem_start_mb: Option<f64>,
    peak_mb: f64,
    steps: Vec<StepTiming>,
    sampler: Option<LoopLagSampler>,
    pause_observer: Option<Box<dyn PauseObserver>>,
    finished: bool,
}

/// Samples process resource usage around one command's execution.
///
/// Cheap to clone; clones share the same underlying state so the handle
/// can be handed to the unit of work while the orchestrator retains one
/// for [`Profiler::finish`].
#[derive(Clone)]
pub struct Profiler {
    inner: Arc<Mutex<Inner>>,
}

/// End handle for a named step, returned by [`Profiler::step`].
pub struct StepHandle {
    inner: Arc<Mutex<Inner>>,
    index: usize,
}

impl Profiler {
    /// Construct a profiler for `command`, capturing wall/CPU/memory
    /// baselines. When `enabled`, additionally starts the event-loop lag
    /// sampler and the collector pause observer; both are best-effort and
    /// their absence degrades silently.
    pub fn new(command: &str, enabled: bool) -> Self {
        let sampler = if enabled { LoopLagSampler::start() } else { None };
        let pause_observer = if enabled { probes::try_start_pause_observer() } else { None };
        let mem_start_mb = probes::rss_mb();

        Self {
            inner: Arc::new(Mutex::new(Inner {
                command: command.to_string(),
                wall_start: Instant::now(),
                cpu_start: probes::resource_usage(),
                mem_start_mb,
                peak_mb: mem_start_mb.unwrap_or(0.0),
                steps: Vec::new(),
                sampler,
                pause_observer,
                finished: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Milliseconds elapsed since construction, rounded to 2dp.
    pub fn elapsed_ms(&self) -> f64 {
        round2(self.lock().wall_start.elapsed().as_secs_f64() * 1000.0)
    }

    /// Open a named sub-timer. Steps may overlap or run sequentially;
    /// a step whose handle is never ended is reported without a duration.
    pub fn step(&self, name: &str) -> StepHandle {
        let mut inner = self.lock();
        let start_ms = round2(inner.wall_start.elapsed().as_secs_f64() * 1000.0);
        inner.steps.push(StepTiming {
            name: name.to_string(),
            start_ms,
            end_ms: None,
            duration_ms: None,
        });
        let index = inner.steps.len() - 1;
        drop(inner);
        StepHandle { inner: Arc::clone(&self.inner), index }
    }

    /// Update the running peak-RSS watermark. Callers sample
    /// opportunistically at flow-control boundaries; there is no
    /// background interrupt.
    pub fn sample_mem_peak(&self) {
        if let Some(rss) = probes::rss_mb() {
            let mut inner = self.lock();
            if rss > inner.peak_mb {
                inner.peak_mb = rss;
            }
        }
    }

    /// Capture end-of-run counters, tear down any live samplers (no-op if
    /// none were started), and compute the immutable summary.
    pub fn finish(&self, ok: bool, error: Option<&str>) -> ProfileSummary {
        let mut inner = self.lock();
        if inner.finished {
            tracing::debug!(command = %inner.command, "profiler finished more than once");
        }
        inner.finished = true;

        let wall_ms = round2(inner.wall_start.elapsed().as_secs_f64() * 1000.0);

        // One end-of-run reading; the CPU and I/O deltas must come from
        // the same instant.
        let resource_end = probes::resource_usage();
        let cpu = match (inner.cpu_start, resource_end) {
            (Some(start), Some(end)) => CpuTimes {
                user_ms: round2((end.user_ms - start.user_ms).max(0.0)),
                system_ms: round2((end.system_ms - start.system_ms).max(0.0)),
            },
            _ => CpuTimes::default(),
        };
        let io = match (inner.cpu_start, resource_end) {
            (Some(start), Some(end)) => {
                let reads = end.reads.saturating_sub(start.reads);
                let writes = end.writes.saturating_sub(start.writes);
                IoCounters {
                    reads,
                    writes,
                    bytes_read: reads * IO_BLOCK_BYTES,
                    bytes_written: writes * IO_BLOCK_BYTES,
                }
            }
            _ => IoCounters::default(),
        };

        let start_mb = inner.mem_start_mb.unwrap_or(0.0);
        let end_mb = probes::rss_mb().unwrap_or(start_mb);
        let peak_mb = inner.peak_mb.max(end_mb).max(start_mb);
        let memory = MemoryUsage {
            start_mb: round2(start_mb),
            peak_mb: round2(peak_mb),
            end_mb: round2(end_mb),
        };

        let event_loop = inner.sampler.take().and_then(LoopLagSampler::stop);
        let gc = inner
            .pause_observer
            .take()
            .map(|mut observer| observer.drain())
            .unwrap_or_default();

        ProfileSummary {
            command: inner.command.clone(),
            ok,
            wall_ms,
            cpu,
            memory,
            event_loop,
            io,
            gc,
            steps: inner.steps.clone(),
            error: error.map(str::to_string),
        }
    }
}

impl StepHandle {
    /// Stamp the step's end offset and derived duration. Consuming the
    /// handle makes double-ends unrepresentable.
    pub fn end(self) {
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let end_ms = round2(inner.wall_start.elapsed().as_secs_f64() * 1000.0);
        if let Some(step) = inner.steps.get_mut(self.index) {
            if step.end_ms.is_none() {
                step.end_ms = Some(end_ms);
                step.duration_ms = Some(round2(end_ms - step.start_ms));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_finish_produces_consistent_summary() {
        let profiler = Profiler::new("generate", true);
        tokio::time::sleep(Duration::from_millis(20)).await;
        profiler.sample_mem_peak();
        let summary = profiler.finish(true, None);

        assert_eq!(summary.command, "generate");
        assert!(summary.ok);
        assert!(summary.wall_ms >= 0.0);
        assert!(summary.memory.peak_mb >= summary.memory.start_mb.min(summary.memory.end_mb));
        assert!(summary.error.is_none());
        // No collector on this runtime.
        assert!(summary.gc.is_empty());
    }

    #[tokio::test]
    async fn test_steps_record_durations() {
        let profiler = Profiler::new("generate", false);
        let step = profiler.step("write files");
        tokio::time::sleep(Duration::from_millis(10)).await;
        step.end();

        // Dropping a handle without calling end() leaves the step open.
        let abandoned = profiler.step("abandoned");
        drop(abandoned);

        let summary = profiler.finish(true, None);
        assert_eq!(summary.steps.len(), 2);

        let done = &summary.steps[0];
        assert_eq!(done.name, "write files");
        assert!(done.duration_ms.unwrap() >= 0.0);
        assert_eq!(done.duration_ms.is_some(), done.end_ms.is_some());

        let open = &summary.steps[1];
        assert!(open.end_ms.is_none());
        assert!(open.duration_ms.is_none());
    }

    #[test]
    fn test_disabled_profiler_has_no_event_loop_stats() {
        let profiler = Profiler::new("quick", false);
        let summary = profiler.finish(true, None);
        assert!(summary.event_loop.is_none());
    }

    #[test]
    fn test_profiler_without_runtime_degrades() {
        // Enabled, but no tokio runtime: sampler acquisition fails softly.
        let profiler = Profiler::new("no-runtime", true);
        let summary = profiler.finish(true, None);
        assert!(summary.event_loop.is_none());
    }

    #[tokio::test]
    async fn test_finish_records_failure() {
        let profiler = Profiler::new("broken", false);
        let summary = profiler.finish(false, Some("template not found"));
        assert!(!summary.ok);
        assert_eq!(summary.error.as_deref(), Some("template not found"));
    }

    #[tokio::test]
    async fn test_enabled_profiler_collects_loop_stats() {
        let profiler = Profiler::new("sampled", true);
        tokio::time::sleep(Duration::from_millis(60)).await;
        let summary = profiler.finish(true, None);

        let stats = summary.event_loop.expect("sampler ran for several ticks");
        assert!(stats.max >= stats.p50);
    }
}
