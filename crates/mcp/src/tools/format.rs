//! Response reading, rendering and input validation shared by all tools.
//!
//! Response envelopes are never trusted: every accessor tolerates missing
//! keys, wrong types and non-object roots.

use crate::protocol::CallToolResult;
use bedrock_client::ApiFailure;
use serde_json::Value;
use std::fmt::Display;

/// Placeholder for absent fields.
pub const UNKNOWN: &str = "Unknown";

/// Follow `path` through nested objects.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(key))
}

/// Render a scalar for display: strings without quotes, null as absent.
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Field rendered for display, or `"Unknown"`.
pub fn field_or_unknown(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(display_value)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Non-empty string field.
pub fn str_field<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

/// The envelope's `message`, or the given default.
pub fn message_or(value: &Value, default: impl Into<String>) -> String {
    str_field(value, &["message"])
        .map(str::to_string)
        .unwrap_or_else(|| default.into())
}

/// Array at `path`, empty when absent or not an array.
pub fn array_at<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    lookup(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Whether a value is absent or an empty container/string.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

/// Pretty JSON with two-space indentation.
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Header line followed by `  - item` lines.
pub fn bullet_list<I, S>(header: impl Into<String>, items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Display,
{
    let mut lines = vec![header.into()];
    lines.extend(items.into_iter().map(|item| format!("  - {}", item)));
    lines.join("\n")
}

/// Failure result naming the attempted operation.
pub fn failed(action: impl Display, failure: &ApiFailure) -> CallToolResult {
    CallToolResult::failure(format!("{}: {}", action, failure))
}

/// Validation failure result; no request has been sent.
pub fn invalid(message: impl Into<String>) -> CallToolResult {
    CallToolResult::failure(message)
}

/// Check membership of an enumerated parameter.
pub fn require_choice(param: &str, value: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {} '{}'. Must be one of: {}",
            param,
            value,
            allowed.join(", ")
        ))
    }
}

/// Characters that would escape or reshape a single path segment.
const RESERVED_PATH_CHARS: &[char] = &['/', '\\', '?', '#', '%'];

/// Check a value that is interpolated into a URL path.
pub fn require_identifier(param: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} must not be empty.", param));
    }
    if value == "." || value == ".." {
        return Err(format!("{} '{}' is not a valid name.", param, value));
    }
    if let Some(c) = value.chars().find(|c| RESERVED_PATH_CHARS.contains(c)) {
        return Err(format!("{} '{}' must not contain '{}'.", param, value, c));
    }
    Ok(())
}

/// `/api/server/{name}/{suffix}`
pub fn server_path(server_name: &str, suffix: &str) -> String {
    format!("/api/server/{}/{}", server_name, suffix)
}

/// Early-return a validation failure from `execute`.
macro_rules! ensure_valid {
    ($check:expr) => {
        if let Err(message) = $check {
            return Ok($crate::tools::format::invalid(message));
        }
    };
}

pub(crate) use ensure_valid;
