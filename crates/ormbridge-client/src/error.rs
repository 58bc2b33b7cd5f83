//! Client error types.

use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection settings are unusable. Never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// The remote server rejected a call.
    #[error("remote error: {0}")]
    Remote(String),

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ormbridge_proto::Error),

    /// Notification delivery failed.
    #[error("notification error: {0}")]
    Notification(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
