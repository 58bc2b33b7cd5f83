//! Remote identifier to local model registry.

use std::collections::HashMap;
use std::fmt;

use crate::error::Error;
use crate::model::ModelHandle;

/// Maps remote model identifiers to local model handles.
///
/// Bindings are write-once: a second registration under the same identifier
/// is rejected and leaves the existing binding in place.
#[derive(Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelHandle>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `remote_id` to `model`.
    pub fn register(&mut self, remote_id: &str, model: ModelHandle) -> Result<(), Error> {
        if self.models.contains_key(remote_id) {
            return Err(Error::DuplicateRegistration {
                model: remote_id.to_string(),
            });
        }
        self.models.insert(remote_id.to_string(), model);
        Ok(())
    }

    /// Get the model bound to `remote_id`.
    pub fn get(&self, remote_id: &str) -> Option<&ModelHandle> {
        self.models.get(remote_id)
    }

    /// Check if `remote_id` is bound.
    pub fn contains(&self, remote_id: &str) -> bool {
        self.models.contains_key(remote_id)
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.models.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Remove every binding.
    pub fn clear(&mut self) {
        self.models.clear();
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.identifiers())
            .finish()
    }
}
