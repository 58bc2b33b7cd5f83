//! ormbridge core - local catalog, field translation, and model linking.
//!
//! This crate turns remote field descriptors into local fields and keeps track
//! of which remote models are bound to which local models.

pub mod catalog;
pub mod error;
pub mod link;
pub mod model;
pub mod translator;

pub use catalog::{FieldType, LocalFieldSpec, ScalarType};
pub use error::Error;
pub use link::{Attachment, DeferredLinkTable, LinkState, ModelRegistry, PendingLink, PlannedAttachment};
pub use model::{AttachedField, BridgedModel, BridgedModelBuilder, LocalModel, ModelHandle, ReverseLink};
pub use translator::{DefaultTranslator, FieldTranslator};

/// Re-export protocol types.
pub use ormbridge_proto as proto;
