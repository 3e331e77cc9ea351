//! Error types for CaseLinker.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaseLinkError {
    #[error("Scan service unreachable at {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Scan service returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Scan service busy: {0}")]
    Busy(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response from scan service: {0}")]
    Decode(String),

    #[error("Invalid value for {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CaseLinkError {
    /// Build the error for a non-2xx response.
    ///
    /// FastAPI wraps messages as `{"detail": "..."}`; that text is unwrapped
    /// when present, otherwise the raw body is kept.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").cloned())
            .map(|d| match d {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_else(|| body.trim().to_string());

        match status {
            404 => CaseLinkError::NotFound(detail),
            409 => CaseLinkError::Busy(detail),
            _ => CaseLinkError::Status { status, detail },
        }
    }

    /// Whether the service could not be reached at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CaseLinkError::Transport { .. })
    }
}
