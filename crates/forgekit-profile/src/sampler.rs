//! Event-loop delay sampler.
//!
//! Measures scheduler lag by arming a periodic timer and recording how far
//! past its deadline each tick fires. Samples are kept in the timer's
//! native nanosecond resolution and converted to milliseconds when the
//! percentiles are computed at stop time.
//!
//! Starting the sampler requires a running tokio runtime; when none is
//! available acquisition fails softly and the profile simply omits the
//! event-loop section.

use crate::summary::EventLoopStats;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Sampling period. Coarse enough to stay invisible in the profile,
/// fine enough to catch multi-millisecond stalls.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

pub(crate) struct LoopLagSampler {
    samples_ns: Arc<Mutex<Vec<u64>>>,
    task: JoinHandle<()>,
}

impl LoopLagSampler {
    /// Start sampling on the current runtime. `None` when no runtime is
    /// running in this context.
    pub(crate) fn start() -> Option<Self> {
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let samples_ns = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&samples_ns);

        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(SAMPLE_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await; // first tick fires immediately
            let mut last = Instant::now();
            loop {
                ticker.tick().await;
                let now = Instant::now();
                let lag = now.duration_since(last).saturating_sub(SAMPLE_INTERVAL);
                let mut samples = sink.lock().unwrap_or_else(|p| p.into_inner());
                samples.push(lag.as_nanos() as u64);
                drop(samples);
                last = now;
            }
        });

        Some(Self { samples_ns, task })
    }

    /// Stop sampling and compute percentiles. `None` when no samples were
    /// collected before stop. The sampling task is torn down when the
    /// consumed sampler drops at the end of this call.
    pub(crate) fn stop(self) -> Option<EventLoopStats> {
        let mut samples = {
            let guard = self.samples_ns.lock().unwrap_or_else(|p| p.into_inner());
            guard.clone()
        };
        if samples.is_empty() {
            return None;
        }
        samples.sort_unstable();

        let to_ms = |ns: u64| ((ns as f64 / 1_000_000.0) * 100.0).round() / 100.0;
        Some(EventLoopStats {
            p50: to_ms(percentile(&samples, 50.0)),
            p90: to_ms(percentile(&samples, 90.0)),
            p99: to_ms(percentile(&samples, 99.0)),
            max: to_ms(*samples.last().unwrap_or(&0)),
        })
    }
}

/// A sampler dropped without [`LoopLagSampler::stop`] (the owning
/// profiler was cancelled mid-command) must not leave the sampling task
/// appending to the sink for the rest of the process.
impl Drop for LoopLagSampler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Nearest-rank percentile over an ascending-sorted slice.
fn percentile(sorted: &[u64], pct: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
