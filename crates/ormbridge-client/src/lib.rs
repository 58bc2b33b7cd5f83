//! ormbridge client - session bootstrap for the remote business-object server.
//!
//! The wire protocol sits behind [`RemoteClient`]; this crate owns what
//! happens around it: validating the connection settings, retrying a failed
//! connection a bounded number of times, and reporting a terminal failure.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use ormbridge_client::{ConnectionConfig, ConnectionManager, RetryPolicy, Snapshot, SnapshotClient};
//!
//! let client = Arc::new(SnapshotClient::new(Snapshot::load("remote.json")?));
//! let config = ConnectionConfig::new("erp.internal")
//!     .with_database("prod")
//!     .with_credentials("admin", "admin");
//!
//! let outcome = ConnectionManager::new(client, config)
//!     .with_retry_policy(RetryPolicy::default())
//!     .establish()?;
//!
//! if let Some(session) = outcome.session {
//!     let fields = session.describe_fields("res.partner", &Default::default())?;
//!     println!("{} fields", fields.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod notify;
pub mod session;
pub mod snapshot;

pub use config::{ConnectionConfig, NotificationConfig, RetryPolicy};
pub use error::Error;
pub use manager::{ConnectOutcome, ConnectionManager, RetryState, Sleeper};
pub use notify::{FailureReport, LogNotifier, Notification, Notifier};
pub use session::{RemoteClient, RemoteSession, Session, SessionContext};
pub use snapshot::{Snapshot, SnapshotClient};

/// Re-export protocol types.
pub use ormbridge_proto as proto;
