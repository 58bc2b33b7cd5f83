//! Cross-model linking.
//!
//! Relational fields may name a target model that has not been finalized yet.
//! Such fields wait in the [`DeferredLinkTable`] under the target's identifier
//! and are replayed once the target registers.

mod deferred;
mod registry;
mod state;

pub use deferred::{DeferredLinkTable, PendingLink};
pub use registry::ModelRegistry;
pub use state::{Attachment, LinkState, PlannedAttachment};
