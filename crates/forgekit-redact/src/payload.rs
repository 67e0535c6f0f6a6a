//! Recursive payload scrubbing.
//!
//! Walks arbitrary nested JSON structures and applies value redaction at
//! every keyed position. A `serde_json::Value` tree cannot contain
//! reference cycles, so the identity tracking a general object graph
//! would need collapses to a depth bound here: past [`MAX_DEPTH`] the
//! walker substitutes the circular marker and stops descending, which
//! guarantees termination on any input.

use crate::patterns::{is_sensitive_key, is_sensitive_value};
use crate::policy::RedactionPolicy;
use crate::{CIRCULAR_MARKER, REDACTED_MARKER};
use serde_json::Value;

/// Maximum nesting depth the walker will descend before substituting the
/// circular marker. Deep enough for any real command payload.
pub const MAX_DEPTH: usize = 64;

/// Redact a single value at a keyed position.
///
/// A sensitive key redacts the whole value regardless of its content
/// (containers included); otherwise string values matching a sensitive
/// shape are replaced; everything else passes through unchanged.
pub fn redact_value(value: &Value, key: Option<&str>, policy: &RedactionPolicy) -> Value {
    if policy.disabled {
        return value.clone();
    }
    if key.is_some_and(|k| is_sensitive_key(k, policy)) {
        return Value::String(REDACTED_MARKER.to_string());
    }
    match value {
        Value::String(s) if is_sensitive_value(s) => Value::String(REDACTED_MARKER.to_string()),
        other => other.clone(),
    }
}

/// Recursively scrub a payload before it is logged.
///
/// A no-op pass-through when the policy disables redaction. Sensitive
/// fields are caught at any nesting depth without the caller enumerating
/// paths. Idempotent: the markers themselves never re-classify.
pub fn redact_payload(payload: &Value, policy: &RedactionPolicy) -> Value {
    if policy.disabled {
        return payload.clone();
    }
    walk(payload, None, policy, 0)
}

fn walk(value: &Value, key: Option<&str>, policy: &RedactionPolicy, depth: usize) -> Value {
    if depth > MAX_DEPTH {
        return Value::String(CIRCULAR_MARKER.to_string());
    }
    if key.is_some_and(|k| is_sensitive_key(k, policy)) {
        return Value::String(REDACTED_MARKER.to_string());
    }
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), walk(v, Some(k), policy, depth + 1)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| walk(item, None, policy, depth + 1))
                .collect(),
        ),
        Value::String(s) if is_sensitive_value(s) => Value::String(REDACTED_MARKER.to_string()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_sensitive_key_redacts_any_value_shape() {
        let policy = RedactionPolicy::default();
        let payload = json!({"password": "hello"});
        let redacted = redact_payload(&payload, &policy);
        assert_eq!(redacted, json!({"password": REDACTED_MARKER}));
    }

    #[test]
    fn test_sensitive_key_redacts_whole_container() {
        let policy = RedactionPolicy::default();
        let payload = json!({"credentials": {"user": "a", "pass": "b"}});
        let redacted = redact_payload(&payload, &policy);
        assert_eq!(redacted, json!({"credentials": REDACTED_MARKER}));
    }

    #[test]
    fn test_deeply_nested_sensitive_field_is_caught() {
        let policy = RedactionPolicy::default();
        let payload = json!({"a": {"b": [{"c": {"api_key": "k-1234567890"}}]}});
        let redacted = redact_payload(&payload, &policy);
        assert_eq!(
            redacted,
            json!({"a": {"b": [{"c": {"api_key": REDACTED_MARKER}}]}})
        );
    }

    #[test]
    fn test_value_shape_redacted_without_sensitive_key() {
        let policy = RedactionPolicy::default();
        let payload = json!({"header": "Bearer abc123def456ghi789"});
        let redacted = redact_payload(&payload, &policy);
        assert_eq!(redacted, json!({"header": REDACTED_MARKER}));
    }

    #[test]
    fn test_benign_payload_passes_through() {
        let policy = RedactionPolicy::default();
        let payload = json!({
            "name": "UserCard",
            "files": ["user-card.ts", "user-card.test.ts"],
            "count": 2,
            "dry_run": false,
        });
        assert_eq!(redact_payload(&payload, &policy), payload);
    }

    #[test]
    fn test_disabled_policy_is_pass_through() {
        let policy = RedactionPolicy::disabled();
        let payload = json!({"password": "hello"});
        assert_eq!(redact_payload(&payload, &policy), payload);
    }

    #[test]
    fn test_pathological_depth_terminates_with_marker() {
        let policy = RedactionPolicy::default();
        let mut payload = json!("leaf");
        for _ in 0..(MAX_DEPTH + 10) {
            payload = json!({ "next": payload });
        }
        let redacted = redact_payload(&payload, &policy);
        let rendered = serde_json::to_string(&redacted).unwrap();
        assert!(rendered.contains(CIRCULAR_MARKER));
        assert!(!rendered.contains("leaf"));
    }

    #[test]
    fn test_redaction_is_idempotent_on_fixture() {
        let policy = RedactionPolicy::default();
        let payload = json!({
            "password": "hello",
            "nested": {"token": ["a", "b"]},
            "card": "4111 1111 1111 1111",
            "plain": "value",
        });
        let once = redact_payload(&payload, &policy);
        let twice = redact_payload(&once, &policy);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_redact_value_key_wins_over_content() {
        let policy = RedactionPolicy::default();
        let value = json!(42);
        assert_eq!(
            redact_value(&value, Some("auth_token"), &policy),
            json!(REDACTED_MARKER)
        );
        assert_eq!(redact_value(&value, Some("count"), &policy), json!(42));
    }

    fn arb_json(depth: u32) -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-zA-Z0-9 ._-]{0,40}".prop_map(Value::String),
        ];
        leaf.prop_recursive(depth, 64, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::hash_map("[a-zA-Z_]{1,12}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_redaction_is_idempotent(payload in arb_json(4)) {
            let policy = RedactionPolicy::default();
            let once = redact_payload(&payload, &policy);
            let twice = redact_payload(&once, &policy);
            prop_assert_eq!(once, twice);
        }
    }
}
