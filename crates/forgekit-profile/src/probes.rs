//! Capability-checked platform probes.
//!
//! Each probe attempts to read a platform counter and yields `None` when
//! the capability is unavailable. Callers treat `None` as "reduced
//! feature", never as an error.

use crate::summary::GcEvent;

/// Block size used by the kernel's inblock/oublock accounting.
pub(crate) const IO_BLOCK_BYTES: u64 = 512;

/// One point-in-time read of the process resource counters.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ResourceSample {
    pub user_ms: f64,
    pub system_ms: f64,
    pub reads: u64,
    pub writes: u64,
}

#[cfg(unix)]
pub(crate) fn resource_usage() -> Option<ResourceSample> {
    fn timeval_ms(tv: libc::timeval) -> f64 {
        tv.tv_sec as f64 * 1000.0 + tv.tv_usec as f64 / 1000.0
    }

    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return None;
    }
    Some(ResourceSample {
        user_ms: timeval_ms(usage.ru_utime),
        system_ms: timeval_ms(usage.ru_stime),
        reads: usage.ru_inblock.max(0) as u64,
        writes: usage.ru_oublock.max(0) as u64,
    })
}

#[cfg(not(unix))]
pub(crate) fn resource_usage() -> Option<ResourceSample> {
    None
}

/// Current resident set size in megabytes.
#[cfg(target_os = "linux")]
pub(crate) fn rss_mb() -> Option<f64> {
    // statm field 2 is resident pages.
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let resident_pages: f64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if page_size <= 0 {
        return None;
    }
    Some(resident_pages * page_size as f64 / (1024.0 * 1024.0))
}

#[cfg(all(unix, not(target_os = "linux")))]
pub(crate) fn rss_mb() -> Option<f64> {
    // No statm outside Linux; fall back to the high-water mark, which is
    // reported in bytes on macOS and kilobytes elsewhere.
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return None;
    }
    let maxrss = usage.ru_maxrss.max(0) as f64;
    #[cfg(target_os = "macos")]
    let mb = maxrss / (1024.0 * 1024.0);
    #[cfg(not(target_os = "macos"))]
    let mb = maxrss / 1024.0;
    Some(mb)
}

#[cfg(not(unix))]
pub(crate) fn rss_mb() -> Option<f64> {
    None
}

/// Observer for runtime collector pauses.
///
/// Acquisition is best-effort. This runtime exposes no collector pause
/// hook, so acquisition yields `None` and the summary's pause list stays
/// empty; the adapter seam is kept so an allocator-backed observer can be
/// slotted in without touching the profiler.
pub(crate) trait PauseObserver: Send {
    /// Drain the pauses observed so far.
    fn drain(&mut self) -> Vec<GcEvent>;
}

pub(crate) fn try_start_pause_observer() -> Option<Box<dyn PauseObserver>> {
    None
}
