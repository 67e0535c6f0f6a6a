//! Command orchestration for ForgeKit.
//!
//! The orchestrator is the single point that converts failures into exit
//! codes; nothing below it touches the process exit status. It wraps a
//! caller-supplied unit of work with:
//!
//! - a continuation-scoped trace identity (`forgekit-trace`),
//! - a per-invocation resource profiler (`forgekit-profile`),
//! - a redacting, trace-aware structured logger (`forgekit-logging`).
//!
//! # Example
//!
//! ```rust,no_run
//! use forgekit_runner::{run_command, CommandError, CommandOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let outcome = run_command("generate", CommandOptions::default(), |ctx| async move {
//!         let step = ctx.profiler.step("write files");
//!         ctx.logger.info("scaffolding component");
//!         // ... do the work ...
//!         step.end();
//!         Ok::<_, CommandError>("UserCard")
//!     })
//!     .await;
//!
//!     std::process::exit(outcome.exit_code);
//! }
//! ```

pub mod env;
pub mod error;
pub mod options;
pub mod runner;

pub use env::{
    EnvOverrides, ENV_LOG_LEVEL, ENV_METRICS_JSON, ENV_NO_REDACT, ENV_PLAIN_OUTPUT, ENV_PROFILE,
    ENV_TRACE_ID,
};
pub use error::{CommandError, EXIT_FAILURE, EXIT_SUCCESS, EXIT_WARNING};
pub use options::CommandOptions;
pub use runner::{run_command, CommandContext, CommandOutcome};
