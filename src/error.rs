//! Error types for the assistant router

use axum::http::StatusCode;
use thiserror::Error;

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, RouterError>;

#[derive(Error, Debug)]
pub enum RouterError {

    // =============================
    // Caller-Visible Errors
    // =============================

    #[error("Missing 'message' in request.")]
    MissingMessage,

    #[error("Server misconfigured: {0}")]
    Config(String),

    #[error("KB load error: {0}")]
    KnowledgeBaseLoad(String),

    // =============================
    // Optional Service Errors (never surfaced)
    // =============================

    #[error("{service} error: {message}")]
    Service {
        service: &'static str,
        message: String,
    },

    #[error("{service} timed out after {after_ms}ms")]
    Timeout {
        service: &'static str,
        after_ms: u64,
    },

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RouterError {
    pub fn service(service: &'static str, message: impl Into<String>) -> Self {
        RouterError::Service {
            service,
            message: message.into(),
        }
    }

    pub fn timeout(service: &'static str, limit: std::time::Duration) -> Self {
        RouterError::Timeout {
            service,
            after_ms: limit.as_millis() as u64,
        }
    }

    /// Pseudo-intent reported to the caller when a request cannot be classified.
    pub fn intent_label(&self) -> &'static str {
        match self {
            RouterError::MissingMessage => "BadRequest",
            RouterError::Config(_) => "ServerConfigError",
            RouterError::KnowledgeBaseLoad(_) => "KBLoadError",
            _ => "ServerError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RouterError::MissingMessage => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
