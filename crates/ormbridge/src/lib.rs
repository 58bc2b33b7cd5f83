//! ormbridge - local models whose fields come from a remote business-object server.
//!
//! A [`BridgeContext`] holds the remote session and the linking state for the
//! whole process. [`SchemaBridge::on_model_finalized`] is called once per local
//! model as the host finishes defining it.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use ormbridge::{BridgeConfig, BridgeContext, SchemaBridge};
//! use ormbridge::client::{ConnectionManager, Snapshot, SnapshotClient};
//!
//! let config = BridgeConfig::load("bridge.json")?;
//! let client = Arc::new(SnapshotClient::new(Snapshot::load("remote.json")?));
//! let manager = ConnectionManager::new(client, config.connection_config())
//!     .with_retry_policy(config.retry_policy());
//!
//! let context = Arc::new(BridgeContext::new());
//! context.connect(&manager)?;
//!
//! let bridge = SchemaBridge::new(context);
//! for model in config.bridged_models() {
//!     bridge.on_model_finalized(model)?;
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod context;
pub mod error;

pub use bridge::{DeferredField, LinkOutcome, LinkReport, SchemaBridge};
pub use config::BridgeConfig;
pub use context::BridgeContext;
pub use error::Error;

pub use ormbridge_core::{
    Attachment, BridgedModel, DefaultTranslator, FieldTranslator, LocalFieldSpec, LocalModel,
    ModelHandle, PendingLink, ReverseLink,
};

/// Re-export the client crate.
pub use ormbridge_client as client;

/// Re-export protocol types.
pub use ormbridge_proto as proto;
