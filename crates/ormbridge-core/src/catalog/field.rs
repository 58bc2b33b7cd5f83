//! Local field specifications.

use serde::Serialize;

use super::types::FieldType;

/// A field to be attached to a local model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalFieldSpec {
    /// Field data type.
    pub field_type: FieldType,
    /// Human-readable label.
    pub label: Option<String>,
    /// Whether the field is required (non-nullable at the application level).
    pub required: bool,
    /// Whether the field may only be read locally.
    pub readonly: bool,
    /// Help text.
    pub help: Option<String>,
}

impl LocalFieldSpec {
    /// Create a new required field.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            label: None,
            required: true,
            readonly: false,
            help: None,
        }
    }

    /// Create an optional field (required = false).
    pub fn optional(field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::new(field_type)
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Mark as read-only.
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Check if this field points at another model.
    pub fn is_relation(&self) -> bool {
        self.field_type.is_relation()
    }
}
