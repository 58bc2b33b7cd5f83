//! Local model handles.
//!
//! [`LocalModel`] is the narrow capability the host model layer exposes to the
//! bridge: identify the model and accept synthesized fields. [`BridgedModel`]
//! is a ready-made implementation built through [`BridgedModelBuilder`].

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use ormbridge_proto::RelationKind;
use parking_lot::RwLock;
use serde::Serialize;

use crate::catalog::LocalFieldSpec;

/// Shared handle to a local model.
pub type ModelHandle = Arc<dyn LocalModel>;

/// A local model that can receive synthesized fields.
///
/// `attach_field` and `add_reverse_link` are called with no bridge lock held,
/// so they may query the bridge.
pub trait LocalModel: Send + Sync {
    /// Local model name.
    fn name(&self) -> &str;

    /// Remote model identifier, or `None` if the model is not bridged.
    fn remote_model(&self) -> Option<&str>;

    /// Field names to request from the remote server. Empty means all fields.
    fn declared_fields(&self) -> BTreeSet<String>;

    /// Attach a field under `name`, replacing any field of the same name.
    fn attach_field(&self, name: &str, spec: LocalFieldSpec);

    /// Record that a relational field on another model points at this one.
    fn add_reverse_link(&self, link: ReverseLink);
}

/// A relational field on another model that targets this model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReverseLink {
    /// Remote identifier of the model declaring the field.
    pub from_model: String,
    /// Name of the declaring field.
    pub field: String,
    /// Relation kind of the declaring field.
    pub kind: RelationKind,
}

/// A field attached to a [`BridgedModel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachedField {
    /// Field name.
    pub name: String,
    /// Field specification.
    pub spec: LocalFieldSpec,
}

/// A local model opted into schema synthesis.
pub struct BridgedModel {
    name: String,
    remote_model: String,
    declared_fields: BTreeSet<String>,
    fields: RwLock<Vec<AttachedField>>,
    reverse_links: RwLock<Vec<ReverseLink>>,
}

impl BridgedModel {
    /// Start building a model bound to `remote_model`.
    pub fn builder(name: impl Into<String>, remote_model: impl Into<String>) -> BridgedModelBuilder {
        BridgedModelBuilder {
            name: name.into(),
            remote_model: remote_model.into(),
            declared_fields: BTreeSet::new(),
        }
    }

    /// Remote model identifier.
    pub fn remote_id(&self) -> &str {
        &self.remote_model
    }

    /// Snapshot of the attached fields, in attachment order.
    pub fn fields(&self) -> Vec<AttachedField> {
        self.fields.read().clone()
    }

    /// Get an attached field by name.
    pub fn field(&self, name: &str) -> Option<LocalFieldSpec> {
        self.fields
            .read()
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.spec.clone())
    }

    /// Check if a field is attached.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.read().iter().any(|f| f.name == name)
    }

    /// Number of attached fields.
    pub fn field_count(&self) -> usize {
        self.fields.read().len()
    }

    /// Snapshot of reverse links pointing at this model.
    pub fn reverse_links(&self) -> Vec<ReverseLink> {
        self.reverse_links.read().clone()
    }
}

impl LocalModel for BridgedModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn remote_model(&self) -> Option<&str> {
        Some(&self.remote_model)
    }

    fn declared_fields(&self) -> BTreeSet<String> {
        self.declared_fields.clone()
    }

    fn attach_field(&self, name: &str, spec: LocalFieldSpec) {
        let mut fields = self.fields.write();
        match fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.spec = spec,
            None => fields.push(AttachedField {
                name: name.to_string(),
                spec,
            }),
        }
    }

    fn add_reverse_link(&self, link: ReverseLink) {
        let mut links = self.reverse_links.write();
        if !links.contains(&link) {
            links.push(link);
        }
    }
}

impl fmt::Debug for BridgedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgedModel")
            .field("name", &self.name)
            .field("remote_model", &self.remote_model)
            .field("fields", &self.fields.read().len())
            .field("reverse_links", &self.reverse_links.read().len())
            .finish()
    }
}

/// Builder for [`BridgedModel`].
#[derive(Debug, Clone)]
pub struct BridgedModelBuilder {
    name: String,
    remote_model: String,
    declared_fields: BTreeSet<String>,
}

impl BridgedModelBuilder {
    /// Request a single remote field.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.declared_fields.insert(name.into());
        self
    }

    /// Request several remote fields.
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared_fields.extend(names.into_iter().map(Into::into));
        self
    }

    /// Finish the model.
    pub fn build(self) -> Arc<BridgedModel> {
        Arc::new(BridgedModel {
            name: self.name,
            remote_model: self.remote_model,
            declared_fields: self.declared_fields,
            fields: RwLock::new(Vec::new()),
            reverse_links: RwLock::new(Vec::new()),
        })
    }
}
