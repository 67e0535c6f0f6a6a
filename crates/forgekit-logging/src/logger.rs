//! The per-invocation structured logger.

use crate::config::LoggerConfig;
use crate::level::LogLevel;
use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use forgekit_redact::{redact_payload, RedactionPolicy};
use serde_json::{Map, Value};
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

struct Inner {
    config: LoggerConfig,
    policy: RedactionPolicy,
    static_fields: Map<String, Value>,
    /// `None` when neither the configured directory nor the temp-dir
    /// fallback could be opened; file logging is then disabled rather
    /// than failing the command.
    file: Option<Mutex<RollingFileAppender>>,
    plain_console: bool,
}

/// Structured logger for one command invocation. Cheap to clone; clones
/// share sinks and configuration.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

fn open_rolling(dir: &Path) -> Option<RollingFileAppender> {
    std::fs::create_dir_all(dir).ok()?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("forgekit")
        .filename_suffix("log")
        .build(dir)
        .ok()
}

impl Logger {
    /// Build a logger from `config`, scrubbing caller fields with
    /// `policy`. Never fails: an unopenable log directory falls back to
    /// the OS temp dir, and failing that file logging is dropped.
    pub fn new(config: LoggerConfig, policy: RedactionPolicy) -> Self {
        let file = open_rolling(&config.log_dir)
            .or_else(|| {
                tracing::debug!(dir = %config.log_dir.display(), "log directory unavailable, using temp fallback");
                open_rolling(&std::env::temp_dir().join("forgekit").join("logs"))
            })
            .map(Mutex::new);

        let mut static_fields = Map::new();
        static_fields.insert("tool_version".into(), Value::String(config.tool_version.clone()));
        static_fields.insert(
            "platform".into(),
            Value::String(format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)),
        );
        if let Some(revision) = &config.git_revision {
            static_fields.insert("revision".into(), Value::String(revision.clone()));
        }

        let plain_console = config.force_plain || !std::io::stderr().is_terminal();

        Self {
            inner: Arc::new(Inner {
                config,
                policy,
                static_fields,
                file,
                plain_console,
            }),
        }
    }

    /// The run identifier this logger stamps on records.
    pub fn run_id(&self) -> &str {
        &self.inner.config.run_id
    }

    pub fn debug(&self, msg: &str) {
        self.log(LogLevel::Debug, msg, None);
    }

    pub fn info(&self, msg: &str) {
        self.log(LogLevel::Info, msg, None);
    }

    pub fn warn(&self, msg: &str) {
        self.log(LogLevel::Warn, msg, None);
    }

    pub fn error(&self, msg: &str) {
        self.log(LogLevel::Error, msg, None);
    }

    pub fn debug_with(&self, msg: &str, fields: Value) {
        self.log(LogLevel::Debug, msg, Some(fields));
    }

    pub fn info_with(&self, msg: &str, fields: Value) {
        self.log(LogLevel::Info, msg, Some(fields));
    }

    pub fn warn_with(&self, msg: &str, fields: Value) {
        self.log(LogLevel::Warn, msg, Some(fields));
    }

    pub fn error_with(&self, msg: &str, fields: Value) {
        self.log(LogLevel::Error, msg, Some(fields));
    }

    /// Emit one record. Caller fields are redacted; the live trace and
    /// span identifiers are read here, at emission time, not at logger
    /// construction.
    pub fn log(&self, level: LogLevel, msg: &str, fields: Option<Value>) {
        if level > self.inner.config.level {
            return;
        }

        let mut record = self.inner.static_fields.clone();
        record.insert("command".into(), Value::String(self.inner.config.command.clone()));
        record.insert("run_id".into(), Value::String(self.inner.config.run_id.clone()));
        record.insert("trace_id".into(), Value::String(forgekit_trace::trace_id()));
        if let Some(span_id) = forgekit_trace::active_span_id() {
            record.insert("span_id".into(), Value::String(span_id));
        }
        record.insert("level".into(), Value::String(level.as_str().to_string()));
        record.insert("msg".into(), Value::String(msg.to_string()));
        record.insert(
            "timestamp".into(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        let scrubbed = fields.map(|f| redact_payload(&f, &self.inner.policy));
        match &scrubbed {
            Some(Value::Object(map)) => {
                for (key, value) in map {
                    record.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
            Some(other) => {
                record.insert("data".into(), other.clone());
            }
            None => {}
        }

        let line = Value::Object(record);
        self.write_file(&line);
        if !self.inner.config.silent {
            self.write_console(level, msg, &line, scrubbed.as_ref());
        }
    }

    fn write_file(&self, line: &Value) {
        if let Some(file) = &self.inner.file {
            let mut appender = file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // A failing sink must never fail the command.
            let _ = writeln!(appender, "{line}");
        }
    }

    fn write_console(&self, level: LogLevel, msg: &str, line: &Value, fields: Option<&Value>) {
        let mut err = std::io::stderr().lock();
        if self.inner.plain_console {
            let _ = writeln!(err, "{line}");
            return;
        }

        let label = match level {
            LogLevel::Error => "error".red().bold(),
            LogLevel::Warn => "warn".yellow().bold(),
            LogLevel::Info => "info".green(),
            LogLevel::Debug => "debug".dimmed(),
        };
        let clock = Utc::now().format("%H:%M:%S");
        let suffix = match fields {
            Some(fields) => format!(" {}", fields.to_string().dimmed()),
            None => String::new(),
        };
        let _ = writeln!(err, "{clock} {label:<5} {msg}{suffix}");
    }
}
