//! Error Types

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Bridge error types
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Persistent storage read/write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Cookie read/write failed
    #[error("Cookie error: {0}")]
    Cookie(String),

    /// Payload or directive parsing failed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External SDK reported an error
    #[error("SDK error: {0}")]
    Sdk(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for BridgeError {
    fn from(err: anyhow::Error) -> Self {
        BridgeError::Other(err.to_string())
    }
}
