//! Logger construction parameters.

use crate::level::LogLevel;
use std::path::PathBuf;
use uuid::Uuid;

/// Short run identifier; eight hex characters is plenty for correlating
/// one process's invocations.
fn short_run_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Configuration for one command's logger.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Command name stamped on every record.
    pub command: String,
    /// Per-invocation run identifier, distinct from the trace identity.
    pub run_id: String,
    /// Tool version stamped on every record.
    pub tool_version: String,
    /// Source-control revision, when the build environment provides one.
    pub git_revision: Option<String>,
    /// Directory for the rotating, date-named log file.
    pub log_dir: PathBuf,
    /// Minimum severity to emit.
    pub level: LogLevel,
    /// Suppress the console mirror entirely.
    pub silent: bool,
    /// Force single-line JSON on the console even on a terminal.
    pub force_plain: bool,
}

impl LoggerConfig {
    /// Sensible defaults for `command`: fresh run id, workspace version,
    /// temp-dir log location, info level, console mirroring on.
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            run_id: short_run_id(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            git_revision: std::env::var("FORGEKIT_GIT_SHA").ok(),
            log_dir: std::env::temp_dir().join("forgekit").join("logs"),
            level: LogLevel::default(),
            silent: false,
            force_plain: false,
        }
    }
}
