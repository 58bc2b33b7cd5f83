//! ormbridge protocol types.
//!
//! This crate defines the metadata the remote business-object server hands
//! back when asked to describe a model's fields.
//!
//! # Modules
//!
//! - [`descriptor`] - Field descriptors and relation kinds
//! - [`error`] - Protocol error types

pub mod descriptor;
pub mod error;

pub use descriptor::{decode_field_map, FieldDescriptor, FieldMap, RelationKind, RelationRef};
pub use error::Error;

/// Session context key carrying the locale applied to remote calls.
pub const CONTEXT_LANG: &str = "lang";
