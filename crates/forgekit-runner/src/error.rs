//! Command failure type and exit-code taxonomy.
//!
//! Exit codes: 0 success, 1 soft warning (degraded but not wrong), 2 and
//! above hard failure. An error's own explicit code always takes
//! precedence over the defaults; an untagged error exits with 1.

use thiserror::Error;

/// Successful execution.
pub const EXIT_SUCCESS: i32 = 0;
/// Soft warning: the command degraded but did not go wrong.
pub const EXIT_WARNING: i32 = 1;
/// Hard failure.
pub const EXIT_FAILURE: i32 = 2;

/// Failure raised by a command's unit of work.
///
/// Carries an optional explicit exit code and an optional source chain.
/// The orchestrator is the only place this is translated into a process
/// exit status.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CommandError {
    message: String,
    exit_code: Option<i32>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CommandError {
    /// An untagged failure; exits with the soft-warning code.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), exit_code: None, source: None }
    }

    /// An expected soft failure, logged at warning level without a chain.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message).with_exit_code(EXIT_WARNING)
    }

    /// An internally-tagged hard failure.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(message).with_exit_code(EXIT_FAILURE)
    }

    /// Override the exit code.
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// Attach an underlying cause.
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The exit code this failure translates to.
    pub fn exit_code(&self) -> i32 {
        self.exit_code.unwrap_or(EXIT_WARNING)
    }

    /// Whether this failure is hard (logged with its cause chain).
    pub fn is_hard(&self) -> bool {
        self.exit_code() >= EXIT_FAILURE
    }

    /// The failure message without the cause chain.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render the cause chain, outermost first.
    pub fn chain(&self) -> Vec<String> {
        let mut chain = vec![self.message.clone()];
        let mut cause: Option<&(dyn std::error::Error + 'static)> =
            self.source.as_deref().map(|e| e as _);
        while let Some(err) = cause {
            chain.push(err.to_string());
            cause = err.source();
        }
        chain
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::fatal(format!("io error: {err}")).with_source(err)
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(err: anyhow::Error) -> Self {
        let message = err.to_string();
        CommandError::fatal(message).with_source(Box::<dyn std::error::Error + Send + Sync>::from(err))
    }
}
