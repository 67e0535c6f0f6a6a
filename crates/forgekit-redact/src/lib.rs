//! Sensitive-data redaction for ForgeKit log payloads.
//!
//! Classifies keys and values as sensitive and substitutes a fixed marker
//! before anything reaches a log sink. Redaction is irreversible and
//! idempotent: scrubbing an already-scrubbed payload changes nothing.
//!
//! Configuration is an explicit [`RedactionPolicy`] threaded into every
//! entry point, so concurrent command invocations cannot clobber each
//! other's extra keys.

pub mod patterns;
pub mod payload;
pub mod policy;

pub use patterns::{is_sensitive_key, is_sensitive_value};
pub use payload::{redact_payload, redact_value};
pub use policy::RedactionPolicy;

/// Marker substituted for any sensitive value.
pub const REDACTED_MARKER: &str = "[REDACTED]";

/// Marker substituted where the payload walker refuses to descend
/// further (self-referential or pathologically deep structures).
pub const CIRCULAR_MARKER: &str = "[Circular]";
