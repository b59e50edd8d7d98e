//! Error types for the Bedrock client.

use serde_json::Value;

/// Result type for client construction.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiFailure>;

/// Errors raised while building a client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The underlying HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure of a single API call.
///
/// The request core never raises; every outcome that is not a decoded JSON
/// value ends up as one of these variants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiFailure {
    /// No usable token could be obtained.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Non-2xx response after at most one re-authentication.
    #[error("HTTP {status}: {}", summarize_body(.body))]
    Http { status: u16, body: Value },

    /// 2xx response whose body is not JSON.
    #[error("invalid response body: {detail}")]
    InvalidResponseBody { detail: String },

    /// Connection, DNS or timeout failure.
    #[error("transport error: {detail}")]
    Transport { detail: String },
}

impl ApiFailure {
    /// Stable tag for this failure class.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::Http { .. } => "http_error",
            Self::InvalidResponseBody { .. } => "invalid_response_body",
            Self::Transport { .. } => "transport_error",
        }
    }

    /// HTTP status for `Http` failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport {
            detail: err.to_string(),
        }
    }

    /// Create an HTTP failure from a status code and raw response body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let body = serde_json::from_slice(body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()));
        Self::Http { status, body }
    }
}

/// Short, human-readable rendering of an error body.
fn summarize_body(body: &Value) -> String {
    let message = ["message", "detail", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str));

    match (message, body) {
        (Some(message), _) => truncate(message, 200),
        (None, Value::String(text)) if !text.trim().is_empty() => truncate(text.trim(), 200),
        (None, Value::Null) => "no response body".to_string(),
        (None, Value::String(_)) => "empty response body".to_string(),
        (None, other) => truncate(&other.to_string(), 200),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}
