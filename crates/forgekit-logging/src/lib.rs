//! Structured, trace-aware logging for ForgeKit commands.
//!
//! [`Logger`] instances are built once per command invocation and carry
//! static process metadata plus per-invocation fields. Every emitted
//! record is additionally tagged with the *currently active* trace and
//! span identifiers, read live at emission time, because one logger is
//! reused across the whole command lifetime while the active span changes
//! underneath it.
//!
//! Records always append to a rotating, date-named log file as single-line
//! JSON; the console mirror is human-formatted on a terminal and
//! single-line JSON when piped or when plain output is forced. Caller
//! fields pass through the redaction pipeline before any sink sees them.

pub mod config;
pub mod level;
pub mod logger;

pub use config::LoggerConfig;
pub use level::LogLevel;
pub use logger::Logger;
