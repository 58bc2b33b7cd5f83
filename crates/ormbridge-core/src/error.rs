//! Core error types.

use thiserror::Error;

/// Core linking errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote model identifier is already bound to a local model.
    #[error("remote model {model} is already registered")]
    DuplicateRegistration { model: String },

    /// A link names an origin model that was never registered.
    #[error("origin model {model} is not registered")]
    UnknownOrigin { model: String },
}
