//! Local catalog.
//!
//! Field specifications and types produced by translating remote descriptors.

mod field;
mod types;

pub use field::LocalFieldSpec;
pub use types::{FieldType, ScalarType};
