//! Human-readable rendering of a [`ProfileSummary`].
//!
//! Collector pauses are rolled up per kind here; the structured summary
//! keeps them individually.

use crate::summary::ProfileSummary;
use colored::Colorize;
use std::collections::BTreeMap;

/// Render the performance block shown after a profiled command.
pub fn render_profile(summary: &ProfileSummary) -> String {
    let status = if summary.ok { "ok".green() } else { "failed".red() };
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} [{}]\n",
        "performance".bold(),
        summary.command,
        status
    ));
    out.push_str(&format!("  wall        {:.2} ms\n", summary.wall_ms));
    out.push_str(&format!(
        "  cpu         user {:.2} ms / system {:.2} ms\n",
        summary.cpu.user_ms, summary.cpu.system_ms
    ));
    out.push_str(&format!(
        "  memory      start {:.2} MB / peak {:.2} MB / end {:.2} MB\n",
        summary.memory.start_mb, summary.memory.peak_mb, summary.memory.end_mb
    ));
    if let Some(loop_stats) = &summary.event_loop {
        out.push_str(&format!(
            "  event loop  p50 {:.2} ms / p90 {:.2} ms / p99 {:.2} ms / max {:.2} ms\n",
            loop_stats.p50, loop_stats.p90, loop_stats.p99, loop_stats.max
        ));
    }
    out.push_str(&format!(
        "  io          {} reads ({} B) / {} writes ({} B)\n",
        summary.io.reads, summary.io.bytes_read, summary.io.writes, summary.io.bytes_written
    ));

    if !summary.gc.is_empty() {
        let mut by_kind: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for event in &summary.gc {
            let entry = by_kind.entry(event.kind.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += event.duration_ms;
        }
        for (kind, (count, total_ms)) in by_kind {
            out.push_str(&format!(
                "  gc          {kind} {total_ms:.2} ms across {count} pause(s)\n"
            ));
        }
    }

    if !summary.steps.is_empty() {
        out.push_str("  steps\n");
        for step in &summary.steps {
            match step.duration_ms {
                Some(duration) => out.push_str(&format!(
                    "    {:<24} {:.2} ms\n",
                    step.name, duration
                )),
                None => out.push_str(&format!("    {:<24} unfinished\n", step.name)),
            }
        }
    }

    if let Some(error) = &summary.error {
        out.push_str(&format!("  error       {error}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{CpuTimes, GcEvent, IoCounters, MemoryUsage, StepTiming};

    fn base_summary() -> ProfileSummary {
        ProfileSummary {
            command: "generate".to_string(),
            ok: true,
            wall_ms: 120.5,
            cpu: CpuTimes { user_ms: 10.0, system_ms: 2.0 },
            memory: MemoryUsage { start_mb: 20.0, peak_mb: 30.0, end_mb: 25.0 },
            event_loop: None,
            io: IoCounters::default(),
            gc: Vec::new(),
            steps: Vec::new(),
            error: None,
        }
    }

    #[test]
    fn test_render_includes_core_sections() {
        let rendered = render_profile(&base_summary());
        assert!(rendered.contains("generate"));
        assert!(rendered.contains("wall        120.50 ms"));
        assert!(rendered.contains("user 10.00 ms"));
        assert!(rendered.contains("peak 30.00 MB"));
        // Absent sections stay out of the block.
        assert!(!rendered.contains("event loop"));
        assert!(!rendered.contains("steps"));
    }

    #[test]
    fn test_render_rolls_up_gc_by_kind() {
        let mut summary = base_summary();
        summary.gc = vec![
            GcEvent { kind: "minor".to_string(), duration_ms: 1.0 },
            GcEvent { kind: "minor".to_string(), duration_ms: 2.5 },
            GcEvent { kind: "major".to_string(), duration_ms: 4.0 },
        ];
        let rendered = render_profile(&summary);
        assert!(rendered.contains("minor 3.50 ms across 2 pause(s)"));
        assert!(rendered.contains("major 4.00 ms across 1 pause(s)"));
    }

    #[test]
    fn test_render_marks_unfinished_steps() {
        let mut summary = base_summary();
        summary.steps = vec![
            StepTiming {
                name: "write files".to_string(),
                start_ms: 0.0,
                end_ms: Some(50.0),
                duration_ms: Some(50.0),
            },
            StepTiming {
                name: "cleanup".to_string(),
                start_ms: 50.0,
                end_ms: None,
                duration_ms: None,
            },
        ];
        let rendered = render_profile(&summary);
        assert!(rendered.contains("write files"));
        assert!(rendered.contains("50.00 ms"));
        assert!(rendered.contains("cleanup"));
        assert!(rendered.contains("unfinished"));
    }

    #[test]
    fn test_render_failure_shows_error() {
        let mut summary = base_summary();
        summary.ok = false;
        summary.error = Some("template not found".to_string());
        let rendered = render_profile(&summary);
        assert!(rendered.contains("template not found"));
    }
}
