//! Secret redaction for audit output.
//!
//! Redaction is layered: bearer credentials first, then key/value
//! assignments, then GitHub token shapes. The bearer rule must run before
//! the key/value rule: `Authorization: Bearer <token>` would otherwise
//! bind `Bearer` as the key's value and leave the token itself intact.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static SECRET_KV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(token|secret|password|api[_-]?key|authorization)\b(\s*[:=]\s*)([^\s,;]+)")
        .expect("secret k/v pattern")
});

static BEARER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbearer\s+([a-z0-9\._\-]+)").expect("bearer pattern"));

static GITHUB_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(gh[pousr]_[A-Za-z0-9]{20,})\b").expect("gh token pattern"));

/// Replace recognizable secrets in a string with redaction markers.
///
/// Key/value forms keep the key and separator (`token=[REDACTED]`),
/// bearer credentials keep the scheme (`Bearer [REDACTED]`), and GitHub
/// tokens are replaced whole with `[REDACTED_GITHUB_TOKEN]`.
#[must_use]
pub fn redact_str(input: &str) -> String {
    let out = BEARER.replace_all(input, "Bearer [REDACTED]");
    let out = SECRET_KV.replace_all(&out, |caps: &regex::Captures<'_>| {
        // A scheme word or an already-placed marker is not the secret.
        let value = &caps[3];
        if value.eq_ignore_ascii_case("bearer") || value == "[REDACTED]" {
            caps[0].to_string()
        } else {
            format!("{}{}[REDACTED]", &caps[1], &caps[2])
        }
    });
    GITHUB_TOKEN.replace_all(&out, "[REDACTED_GITHUB_TOKEN]").into_owned()
}

/// Redact every string value in a payload, recursing into nested objects
/// and arrays. Non-string leaves pass through unchanged.
#[must_use]
pub fn redact_payload(payload: Map<String, Value>) -> Map<String, Value> {
    payload
        .into_iter()
        .map(|(k, v)| (k, redact_value(v)))
        .collect()
}

fn redact_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(redact_str(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(redact_value).collect()),
        Value::Object(map) => Value::Object(redact_payload(map)),
        other => other,
    }
}
