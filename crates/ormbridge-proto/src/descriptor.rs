//! Remote field descriptors.
//!
//! A descriptor is the metadata the remote server returns for one field of one
//! of its models. The JSON shape follows the server's field-introspection call:
//! the field name is the map key, and the body carries `type`, `string`,
//! `required`, `relation` and friends.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Field descriptors keyed by field name.
pub type FieldMap = BTreeMap<String, FieldDescriptor>;

/// Kind of a relational field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Foreign key onto the target model.
    ManyToOne,
    /// Reverse side of a many-to-one declared on the target model.
    OneToMany,
    /// Association through a link table.
    ManyToMany,
}

impl RelationKind {
    /// Map a remote type tag to a relation kind.
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        match tag {
            "many2one" => Some(RelationKind::ManyToOne),
            "one2many" => Some(RelationKind::OneToMany),
            "many2many" => Some(RelationKind::ManyToMany),
            _ => None,
        }
    }

    /// The remote type tag for this kind.
    pub fn type_tag(&self) -> &'static str {
        match self {
            RelationKind::ManyToOne => "many2one",
            RelationKind::OneToMany => "one2many",
            RelationKind::ManyToMany => "many2many",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::ManyToOne => write!(f, "many-to-one"),
            RelationKind::OneToMany => write!(f, "one-to-many"),
            RelationKind::ManyToMany => write!(f, "many-to-many"),
        }
    }
}

/// The relational part of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationRef<'a> {
    /// Remote identifier of the target model.
    pub target: &'a str,
    /// Relation kind.
    pub kind: RelationKind,
}

/// Metadata for one remote field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDescriptor {
    /// Field name, unique within its model. Filled in from the map key.
    pub name: String,
    /// Remote identifier of the owning model. Filled in after fetch.
    pub model: String,
    /// Declared type tag (`char`, `many2one`, ...).
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Human-readable label.
    #[serde(rename = "string")]
    pub label: Option<String>,
    /// Whether the remote server requires a value.
    pub required: bool,
    /// Whether the field is read-only on the remote server.
    pub readonly: bool,
    /// Help text.
    pub help: Option<String>,
    /// Maximum length for character fields.
    pub size: Option<u32>,
    /// Allowed `(value, label)` pairs for selection fields.
    pub selection: Vec<(String, String)>,
    /// Target model identifier for relational fields.
    pub relation: Option<String>,
    /// Inverse field on the target model for one-to-many fields.
    pub relation_field: Option<String>,
}

impl FieldDescriptor {
    /// Create a descriptor with the given name and type tag.
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            ..Default::default()
        }
    }

    /// Create a many-to-one descriptor targeting `target`.
    pub fn many_to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, RelationKind::ManyToOne.type_tag()).with_relation(target)
    }

    /// Create a one-to-many descriptor targeting `target` through `inverse`.
    pub fn one_to_many(
        name: impl Into<String>,
        target: impl Into<String>,
        inverse: impl Into<String>,
    ) -> Self {
        let mut descriptor = Self::new(name, RelationKind::OneToMany.type_tag()).with_relation(target);
        descriptor.relation_field = Some(inverse.into());
        descriptor
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Mark as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the relation target.
    pub fn with_relation(mut self, target: impl Into<String>) -> Self {
        self.relation = Some(target.into());
        self
    }

    /// Set the selection options.
    pub fn with_selection<I, V, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        self.selection = options
            .into_iter()
            .map(|(value, label)| (value.into(), label.into()))
            .collect();
        self
    }

    /// Set the maximum length.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Stamp the owning field name and model identifier onto the descriptor.
    pub fn annotate(&mut self, name: &str, model: &str) {
        self.name = name.to_string();
        self.model = model.to_string();
    }

    /// The relation kind implied by the type tag, if any.
    pub fn relation_kind(&self) -> Option<RelationKind> {
        RelationKind::from_type_tag(&self.type_tag)
    }

    /// Check if this is a relational field.
    pub fn is_relational(&self) -> bool {
        self.relation_kind().is_some()
    }

    /// The relation target and kind, if this is a well-formed relational field.
    pub fn relation(&self) -> Option<RelationRef<'_>> {
        let kind = self.relation_kind()?;
        let target = self.relation.as_deref().filter(|t| !t.is_empty())?;
        Some(RelationRef { target, kind })
    }

    /// Check structural consistency.
    pub fn validate(&self) -> Result<(), Error> {
        if self.is_relational() && self.relation().is_none() {
            return Err(Error::InvalidDescriptor {
                field: self.name.clone(),
                reason: format!("{} field without a relation target", self.type_tag),
            });
        }
        Ok(())
    }
}

/// Decode a field map from the JSON body of a field-introspection response.
///
/// Names are stamped from the map keys; the owning model is left empty.
pub fn decode_field_map(bytes: &[u8]) -> Result<FieldMap, Error> {
    let mut fields: FieldMap = serde_json::from_slice(bytes)?;
    for (name, descriptor) in fields.iter_mut() {
        descriptor.name = name.clone();
        descriptor.validate()?;
    }
    Ok(fields)
}
