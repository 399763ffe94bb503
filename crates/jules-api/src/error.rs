//! Error types for `jules-api`.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Body of a non-success response, decoded on a best-effort basis.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetail {
    /// The body parsed as JSON.
    Json(Value),
    /// Anything else (HTML error pages, plain text, empty bodies).
    Text(String),
}

impl ErrorDetail {
    #[must_use]
    pub fn from_body(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(v) => Self::Json(v),
            Err(_) => Self::Text(text.to_string()),
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(v) => {
                let pretty = serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string());
                f.write_str(&pretty)
            }
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Main error type for Jules API calls.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Required configuration is missing or invalid (e.g. no credential). The message is
    /// shown to the caller as is.
    #[error("{0}")]
    Configuration(String),

    /// A caller-supplied repository reference cannot be normalized.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A planned call could not be resolved against the base URL.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The API answered with a non-success status.
    #[error("Jules API {status} {status_text}: {detail}")]
    Remote {
        status: u16,
        status_text: String,
        detail: ErrorDetail,
    },

    /// The HTTP round trip itself failed (DNS, connect, reset).
    #[error("HTTP transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// HTTP status of a remote failure, if this is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(sanitize_reqwest_error(&value))
    }
}

/// Result type alias for Jules API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Render a `reqwest` error without the request's query string or userinfo.
#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        let mut redacted = u.clone();
        let _ = redacted.set_username("");
        let _ = redacted.set_password(None);
        redacted.set_query(None);
        redacted.set_fragment(None);
        msg = msg.replace(u.as_str(), redacted.as_str());
    }
    msg
}
