//! Protocol error types.

use thiserror::Error;

/// Errors raised while decoding remote metadata.
#[derive(Debug, Error)]
pub enum Error {
    /// JSON payload could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A field descriptor is structurally invalid.
    #[error("invalid descriptor for field {field}: {reason}")]
    InvalidDescriptor { field: String, reason: String },
}
