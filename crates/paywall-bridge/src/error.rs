//! Paywall Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaywallError>;

/// Paywall bridge errors
#[derive(Error, Debug)]
pub enum PaywallError {
    /// Core seam error
    #[error(transparent)]
    Core(#[from] bridge_core::BridgeError),

    /// SDK client call failed
    #[error("SDK error: {0}")]
    Sdk(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<anyhow::Error> for PaywallError {
    fn from(err: anyhow::Error) -> Self {
        PaywallError::Core(bridge_core::BridgeError::Other(err.to_string()))
    }
}
