//! The command orchestrator.
//!
//! `run_command` wraps a caller-supplied unit of work with a trace scope,
//! a resource profiler, and a redacting structured logger, then translates
//! the outcome into a numeric exit status. The failure path never
//! propagates out of the orchestrator: callers observe failure only
//! through the returned exit code and the logs.

use crate::env::EnvOverrides;
use crate::error::{CommandError, EXIT_SUCCESS, EXIT_WARNING};
use crate::options::CommandOptions;
use forgekit_logging::{LogLevel, Logger, LoggerConfig};
use forgekit_profile::{render_profile, ProfileSummary, Profiler};
use forgekit_redact::RedactionPolicy;
use forgekit_trace as trace;
use serde_json::json;
use std::future::Future;

/// Context injected into a command's unit of work.
#[derive(Clone)]
pub struct CommandContext {
    pub logger: Logger,
    pub profiler: Profiler,
}

/// Terminal state of one command invocation.
///
/// `run_command` never returns an error; a failed invocation is a
/// `CommandOutcome` with `result: None` and a non-zero `exit_code` for
/// the caller to hand to `std::process::exit`.
#[derive(Debug)]
pub struct CommandOutcome<T> {
    /// The unit of work's value, present only on success.
    pub result: Option<T>,
    /// 0 success, 1 soft warning, 2 and above hard failure.
    pub exit_code: i32,
    /// Trace identity of the invocation's chain.
    pub trace_id: String,
    /// Resource summary captured at finalization.
    pub summary: ProfileSummary,
}

impl<T> CommandOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.exit_code == EXIT_SUCCESS
    }
}

/// Orchestrate one command invocation end to end.
///
/// Establishes a trace identity (environment override honored),
/// constructs the profiler and logger, invokes `work` with the injected
/// context, finalizes the profiler, and translates the outcome into an
/// exit code. In metrics mode the only stdout output is the serialized
/// profile summary.
pub async fn run_command<T, F, Fut>(
    name: &str,
    options: CommandOptions,
    work: F,
) -> CommandOutcome<T>
where
    F: FnOnce(CommandContext) -> Fut,
    Fut: Future<Output = Result<T, CommandError>>,
{
    let env = EnvOverrides::load();
    let handle = trace::new_scope_context(env.trace_id.as_deref());
    trace::scope(handle, execute(name, options, env, work)).await
}

async fn execute<T, F, Fut>(
    name: &str,
    options: CommandOptions,
    env: EnvOverrides,
    work: F,
) -> CommandOutcome<T>
where
    F: FnOnce(CommandContext) -> Fut,
    Fut: Future<Output = Result<T, CommandError>>,
{
    let metrics_json = options.metrics_json || env.metrics_json.unwrap_or(false);
    let profiling = options.profile || env.profile.unwrap_or(false);

    let policy = if options.no_redact || env.no_redact.unwrap_or(false) {
        RedactionPolicy::disabled()
    } else {
        RedactionPolicy::with_extra_keys(options.redact_extra_keys.clone())
    };

    let profiler = Profiler::new(name, profiling);

    let mut logger_config = LoggerConfig::new(name);
    if let Some(dir) = &options.log_dir {
        logger_config.log_dir = dir.clone();
    }
    logger_config.level = env.log_level.unwrap_or(if options.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });
    logger_config.silent = options.quiet || metrics_json;
    logger_config.force_plain = env.plain_output.unwrap_or(false);
    let logger = Logger::new(logger_config, policy);

    if !metrics_json {
        logger.info_with("command started", json!({ "inputs": &options.inputs }));
    }

    let context = CommandContext { logger: logger.clone(), profiler: profiler.clone() };
    let outcome = work(context).await;
    let trace_id = trace::trace_id();

    let outcome = match outcome {
        Ok(value) => {
            let summary = profiler.finish(true, None);
            if metrics_json {
                emit_metrics(&summary);
            } else {
                logger.info_with(
                    "command completed",
                    json!({ "duration_ms": summary.wall_ms, "profile": &summary }),
                );
                if profiling {
                    eprintln!("{}", render_profile(&summary));
                }
                render_trace_tree(&options, &trace_id);
            }
            CommandOutcome { result: Some(value), exit_code: EXIT_SUCCESS, trace_id, summary }
        }
        Err(error) => {
            let exit_code = error.exit_code();
            let summary = profiler.finish(false, Some(error.message()));
            if metrics_json {
                emit_metrics(&summary);
            } else {
                let mut fields = json!({ "exit_code": exit_code });
                if error.is_hard() {
                    // Soft warnings stay chain-free on purpose.
                    fields["error_chain"] = json!(error.chain());
                }
                if exit_code == EXIT_WARNING {
                    logger.warn_with(error.message(), fields);
                } else {
                    logger.error_with(error.message(), fields);
                }
                if profiling {
                    eprintln!("{}", render_profile(&summary));
                }
                render_trace_tree(&options, &trace_id);
            }
            CommandOutcome { result: None, exit_code, trace_id, summary }
        }
    };

    // The archive entry's lifecycle ends with the invocation that owns it.
    trace::archive::clear(&outcome.trace_id);
    outcome
}

fn emit_metrics(summary: &ProfileSummary) {
    let line = serde_json::to_string(summary).unwrap_or_else(|_| "{}".to_string());
    println!("{line}");
}

fn render_trace_tree(options: &CommandOptions, trace_id: &str) {
    if !options.show_trace {
        return;
    }
    let spans = trace::archive::take(trace_id);
    if spans.is_empty() {
        return;
    }
    eprintln!("{}", trace::format_trace_tree(&spans));
}
