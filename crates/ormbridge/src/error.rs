//! Bridge error types.

use thiserror::Error;

/// Bridge errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Linking invariant violated.
    #[error("link error: {0}")]
    Core(#[from] ormbridge_core::Error),

    /// Client error.
    #[error("client error: {0}")]
    Client(#[from] ormbridge_client::Error),

    /// Configuration file could not be decoded.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Background task failed.
    #[error("task error: {0}")]
    Task(String),
}
