//! Per-invocation redaction configuration.

/// Redaction configuration for one command invocation.
///
/// Built by the orchestrator from command options and environment
/// overrides, then threaded explicitly into every redaction entry point.
#[derive(Debug, Clone, Default)]
pub struct RedactionPolicy {
    /// Caller-supplied key fragments, unioned with the built-in catalogue.
    pub extra_keys: Vec<String>,
    /// When set, every redaction entry point becomes a pass-through.
    pub disabled: bool,
}

impl RedactionPolicy {
    /// Policy with additional sensitive key fragments.
    pub fn with_extra_keys(extra_keys: Vec<String>) -> Self {
        Self { extra_keys, disabled: false }
    }

    /// Policy that disables redaction entirely.
    pub fn disabled() -> Self {
        Self { extra_keys: Vec::new(), disabled: true }
    }
}
