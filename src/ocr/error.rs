//! Errors surfaced by OCR backend calls.

use reqwest::StatusCode;
use serde::Deserialize;

/// Everything that can go wrong during one backend call.
///
/// The `Display` text is what users see after the `"Error: "` prefix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// No response: connection refused, DNS failure, timeout, ...
    #[error("{0}")]
    Transport(String),

    /// A success response whose body could not be read or decoded.
    #[error("{0}")]
    Decode(String),

    /// The request could not be built.
    #[error("{0}")]
    InvalidRequest(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl BackendError {
    /// Interpret a non-success response body.
    ///
    /// Uses the JSON `detail` field when there is one, otherwise
    /// `"Server error: <code>"`.
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let message = extract_detail(body)
            .unwrap_or_else(|| format!("Server error: {}", status.as_u16()));
        Self::Status {
            status: status.as_u16(),
            message,
        }
    }

    /// HTTP status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn extract_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        // FastAPI validation errors carry a list here
        other => Some(other.to_string()),
    }
}
