//! Error types for generative backends.

use thiserror::Error;

/// Result type for backend calls.
pub type GenAiResult<T> = Result<T, GenAiError>;

/// Errors from the image and script backends.
#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("Backend not configured: {0}")]
    ConfigError(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Backend returned no result")]
    EmptyResponse,

    #[error("Script analysis failed: {0}")]
    Analysis(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenAiError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn analysis(msg: impl Into<String>) -> Self {
        Self::Analysis(msg.into())
    }

    /// Whether a retry can plausibly succeed. Auth and validation
    /// failures are final; network hiccups and 5xx are not.
    pub fn is_transient(&self) -> bool {
        match self {
            GenAiError::Http(e) => e.is_timeout() || e.is_connect(),
            GenAiError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
