//! Structured errors surfaced by the API client.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Connection failure or other transport problem
    Transport,
    /// Request (or refresh call) did not finish in time
    Timeout,
    /// 401 that could not be recovered by a refresh
    Unauthorized,
    /// The refresh cycle failed; the session has been cleared
    RefreshFailed,
    /// 400/422 with per-field messages
    Validation,
    /// 404
    NotFound,
    /// Any other non-success status
    HttpStatus,
    /// Response body could not be decoded
    Parse,
    /// Session tokens could not be written to disk
    Storage,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Transport => write!(f, "transport"),
            ApiErrorKind::Timeout => write!(f, "timeout"),
            ApiErrorKind::Unauthorized => write!(f, "unauthorized"),
            ApiErrorKind::RefreshFailed => write!(f, "refresh_failed"),
            ApiErrorKind::Validation => write!(f, "validation"),
            ApiErrorKind::NotFound => write!(f, "not_found"),
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Parse => write!(f, "parse"),
            ApiErrorKind::Storage => write!(f, "storage"),
        }
    }
}

/// Error returned by every client call.
///
/// Cloneable so a single refresh failure can be handed to every request
/// that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    /// One-line summary suitable for display
    pub message: String,
    /// Raw response body or underlying cause
    pub details: Option<String>,
    /// Field name -> messages, for validation errors
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            details: None,
            fields: BTreeMap::new(),
        }
    }

    /// Maps a reqwest failure (no usable response) to an error.
    pub fn transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::new(ApiErrorKind::Timeout, format!("Request timed out: {err}"));
        }
        Self::new(ApiErrorKind::Transport, format!("Request failed: {err}"))
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }

    /// Wraps a failure to persist the session.
    pub fn storage(err: &anyhow::Error) -> Self {
        Self::new(
            ApiErrorKind::Storage,
            format!("Failed to save session tokens: {err:#}"),
        )
    }

    /// Builds an error from a non-success response.
    pub fn http_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 => ApiErrorKind::Unauthorized,
            404 => ApiErrorKind::NotFound,
            400 | 422 => ApiErrorKind::Validation,
            _ => ApiErrorKind::HttpStatus,
        };

        let json = serde_json::from_str::<Value>(body).ok();
        let detail = json
            .as_ref()
            .and_then(|v| v.get("detail"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let fields = if kind == ApiErrorKind::Validation {
            json.as_ref().map(field_errors).unwrap_or_default()
        } else {
            BTreeMap::new()
        };

        let message = if let Some(detail) = &detail {
            format!("HTTP {status}: {detail}")
        } else if let Some((field, messages)) = fields.iter().next() {
            format!("HTTP {status}: {field}: {}", messages.join(" "))
        } else {
            format!("HTTP {status}")
        };

        Self {
            kind,
            status: Some(status),
            message,
            details: (!body.is_empty()).then(|| body.to_string()),
            fields,
        }
    }

    /// Wraps the cause of a failed refresh cycle.
    pub fn refresh_failed(cause: &ApiError) -> Self {
        Self {
            kind: ApiErrorKind::RefreshFailed,
            status: cause.status,
            message: format!("Token refresh failed: {}", cause.message),
            details: cause.details.clone(),
            fields: BTreeMap::new(),
        }
    }

    /// The refresh cycle ended without an outcome (leader dropped).
    pub fn refresh_aborted() -> Self {
        Self::new(
            ApiErrorKind::RefreshFailed,
            "Token refresh was abandoned before it completed",
        )
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    /// True when the user has to sign in again.
    pub fn requires_login(&self) -> bool {
        matches!(
            self.kind,
            ApiErrorKind::Unauthorized | ApiErrorKind::RefreshFailed
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for client operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

// DRF style: {"field": ["msg", ...]} or {"field": "msg"}.
fn field_errors(body: &Value) -> BTreeMap<String, Vec<String>> {
    let Some(object) = body.as_object() else {
        return BTreeMap::new();
    };

    object
        .iter()
        .filter(|(key, _)| key.as_str() != "detail")
        .filter_map(|(key, value)| {
            let messages: Vec<String> = match value {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            };
            (!messages.is_empty()).then(|| (key.clone(), messages))
        })
        .collect()
}
