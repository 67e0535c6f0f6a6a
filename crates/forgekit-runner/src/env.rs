//! Environment-derived overrides, read at orchestration time.

use forgekit_logging::LogLevel;

/// Trace-identity override for the invocation.
pub const ENV_TRACE_ID: &str = "FORGEKIT_TRACE_ID";
/// Force profiling on or off.
pub const ENV_PROFILE: &str = "FORGEKIT_PROFILE";
/// Machine-readable metrics mode: the only stdout output is the summary.
pub const ENV_METRICS_JSON: &str = "FORGEKIT_METRICS_JSON";
/// Log verbosity override (error/warn/info/debug).
pub const ENV_LOG_LEVEL: &str = "FORGEKIT_LOG_LEVEL";
/// Force single-line structured console output.
pub const ENV_PLAIN_OUTPUT: &str = "FORGEKIT_PLAIN_OUTPUT";
/// Disable redaction entirely.
pub const ENV_NO_REDACT: &str = "FORGEKIT_NO_REDACT";

/// Snapshot of the recognized environment overrides.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub trace_id: Option<String>,
    pub profile: Option<bool>,
    pub metrics_json: Option<bool>,
    pub log_level: Option<LogLevel>,
    pub plain_output: Option<bool>,
    pub no_redact: Option<bool>,
}

impl EnvOverrides {
    /// Read all overrides from the process environment.
    pub fn load() -> Self {
        Self {
            trace_id: std::env::var(ENV_TRACE_ID).ok().filter(|v| !v.is_empty()),
            profile: flag(ENV_PROFILE),
            metrics_json: flag(ENV_METRICS_JSON),
            log_level: std::env::var(ENV_LOG_LEVEL).ok().and_then(|v| v.parse().ok()),
            plain_output: flag(ENV_PLAIN_OUTPUT),
            no_redact: flag(ENV_NO_REDACT),
        }
    }
}

fn flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| parse_flag(&v))
}

/// Interpret a flag-style environment value. Unrecognized values are
/// treated as unset rather than guessed at.
fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
