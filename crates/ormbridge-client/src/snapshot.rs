//! Remote client backed by a JSON dump of the server's field metadata.
//!
//! Useful to check a model set offline, or to exercise the bridge without a
//! live server.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use ormbridge_proto::FieldMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::error::Error;
use crate::session::{RemoteClient, RemoteSession, SessionContext};

/// Field metadata of a set of remote models.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Database the dump was taken from. When set, connections must name it.
    #[serde(default)]
    pub database: Option<String>,

    /// Field descriptors per remote model identifier.
    #[serde(default)]
    pub models: BTreeMap<String, FieldMap>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict connections to `database`.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Add a model. Descriptor names are stamped from the map keys.
    pub fn with_model(mut self, model: impl Into<String>, mut fields: FieldMap) -> Self {
        let model = model.into();
        for (name, descriptor) in fields.iter_mut() {
            descriptor.annotate(name, &model);
        }
        self.models.insert(model, fields);
        self
    }

    /// Decode a snapshot from JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self, Error> {
        let mut snapshot: Snapshot =
            serde_json::from_slice(bytes).map_err(ormbridge_proto::Error::from)?;
        for (model, fields) in snapshot.models.iter_mut() {
            for (name, descriptor) in fields.iter_mut() {
                descriptor.annotate(name, model);
                descriptor.validate()?;
            }
        }
        Ok(snapshot)
    }

    /// Load a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_json(&bytes)
    }
}

/// [`RemoteClient`] serving a [`Snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    snapshot: Arc<Snapshot>,
}

impl SnapshotClient {
    /// Serve `snapshot`.
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }

    /// The served snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl RemoteClient for SnapshotClient {
    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn RemoteSession>, Error> {
        let host = config.validate()?;
        if let Some(database) = &self.snapshot.database {
            if *database != config.database {
                return Err(Error::Connection(format!(
                    "database {:?} does not exist on {}",
                    config.database, host
                )));
            }
        }
        Ok(Box::new(SnapshotSession {
            snapshot: Arc::clone(&self.snapshot),
        }))
    }
}

struct SnapshotSession {
    snapshot: Arc<Snapshot>,
}

impl RemoteSession for SnapshotSession {
    fn describe_fields(
        &self,
        model: &str,
        fields: &BTreeSet<String>,
        context: &SessionContext,
    ) -> Result<FieldMap, Error> {
        let all = self
            .snapshot
            .models
            .get(model)
            .ok_or_else(|| Error::Remote(format!("object {} doesn't exist", model)))?;

        debug!(model = %model, requested = fields.len(), lang = ?context.lang(), "describing fields from snapshot");

        if fields.is_empty() {
            return Ok(all.clone());
        }
        Ok(all
            .iter()
            .filter(|(name, _)| fields.contains(*name))
            .map(|(name, descriptor)| (name.clone(), descriptor.clone()))
            .collect())
    }
}
