//! Error types for the resetcast engine
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for resetcast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the resetcast engine
#[derive(Error, Debug)]
pub enum Error {
    /// Snapshot source errors (content API fetch failures)
    #[error("snapshot source error: {0}")]
    Source(String),

    /// Shard gateway errors (channel/webhook/message operations)
    #[error("gateway error: {0}")]
    Gateway(String),

    /// Watermark store errors
    #[error("state store error: {0}")]
    StateStore(String),

    /// Target registry errors
    #[error("target registry error: {0}")]
    Registry(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP client errors (from collaborator APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a snapshot source error
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a gateway error
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create a target registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
