//! Per-invocation orchestration options.

use serde_json::Value;
use std::path::PathBuf;

/// Options bag accepted by [`crate::run_command`].
///
/// Mirrors the surrounding tool's global flags; environment overrides
/// (see [`crate::env`]) are applied on top at orchestration time.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Elevate logging to debug level.
    pub verbose: bool,
    /// Suppress the console mirror.
    pub quiet: bool,
    /// Enable resource profiling and print the performance block.
    pub profile: bool,
    /// Machine-readable mode: emit only the serialized profile summary.
    pub metrics_json: bool,
    /// Render the archived trace tree after the command.
    pub show_trace: bool,
    /// Disable redaction for this invocation.
    pub no_redact: bool,
    /// Additional sensitive key fragments for the redaction catalogue.
    pub redact_extra_keys: Vec<String>,
    /// Log-file directory override.
    pub log_dir: Option<PathBuf>,
    /// Best-effort description of the command inputs, logged (after
    /// redaction) with the start marker.
    pub inputs: Value,
}
