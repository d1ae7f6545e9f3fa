//! Cosmetic repair of generation-provider output.
//!
//! Models occasionally wrap inline values in stray braces (`"{12 Hours}"`)
//! or fence the whole answer in a Markdown code block. Neither helper here
//! is a parser; they only clean text before and after `serde_json` runs.

use serde_json::Value;

/// Recursively strip `{` and `}` from every string leaf and trim it.
/// Object keys and non-string scalars are left untouched.
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, sanitize(value)))
                .collect(),
        ),
        Value::String(s) => Value::String(sanitize_str(&s)),
        other => other,
    }
}

pub fn sanitize_str(s: &str) -> String {
    s.replace(['{', '}'], "").trim().to_string()
}

/// Remove every "```json" and "```" marker and trim the remainder.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}
