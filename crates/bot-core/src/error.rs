//! Error Types

use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, BotError>;

/// Core bot error types
#[derive(Error, Debug)]
pub enum BotError {
    /// Session state error
    #[error("Session error: {0}")]
    Session(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for BotError {
    fn from(err: anyhow::Error) -> Self {
        BotError::Other(err.to_string())
    }
}
