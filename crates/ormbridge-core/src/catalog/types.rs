//! Core type definitions for the local catalog.

use serde::Serialize;

/// Scalar data types a synthesized field can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit floating point.
    Float,
    /// Fixed-precision amount in a currency.
    Monetary,
    /// Short string, optionally length-bounded.
    Char {
        /// Maximum number of characters.
        max_length: Option<u32>,
    },
    /// Unbounded text.
    Text,
    /// Unbounded HTML markup.
    Html,
    /// Calendar date.
    Date,
    /// Date and time.
    Timestamp,
    /// Binary data.
    Bytes,
}

/// Field types of the local model layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldType {
    /// A scalar value.
    Scalar(ScalarType),
    /// One value out of a fixed set.
    Selection {
        /// Allowed values.
        variants: Vec<String>,
    },
    /// Foreign key onto another model.
    ForeignKey {
        /// Remote identifier of the target model.
        model: String,
    },
    /// Reverse side of a foreign key declared on another model.
    Reverse {
        /// Remote identifier of the model holding the foreign key.
        model: String,
        /// Name of the foreign key on that model.
        inverse: Option<String>,
    },
    /// Many-to-many association.
    ManyToMany {
        /// Remote identifier of the associated model.
        model: String,
    },
}

impl FieldType {
    /// Create a scalar field type.
    pub fn scalar(scalar: ScalarType) -> Self {
        FieldType::Scalar(scalar)
    }

    /// Create a foreign key field type.
    pub fn foreign_key(model: impl Into<String>) -> Self {
        FieldType::ForeignKey {
            model: model.into(),
        }
    }

    /// The model this field points at, if it is relational.
    pub fn relation_target(&self) -> Option<&str> {
        match self {
            FieldType::ForeignKey { model }
            | FieldType::Reverse { model, .. }
            | FieldType::ManyToMany { model } => Some(model),
            FieldType::Scalar(_) | FieldType::Selection { .. } => None,
        }
    }

    /// Check if this is a relational type.
    pub fn is_relation(&self) -> bool {
        self.relation_target().is_some()
    }

    /// Short name used in listings.
    pub fn type_name(&self) -> String {
        match self {
            FieldType::Scalar(ScalarType::Char {
                max_length: Some(n),
            }) => format!("char({})", n),
            FieldType::Scalar(scalar) => match scalar {
                ScalarType::Bool => "bool",
                ScalarType::Integer => "integer",
                ScalarType::Float => "float",
                ScalarType::Monetary => "monetary",
                ScalarType::Char { .. } => "char",
                ScalarType::Text => "text",
                ScalarType::Html => "html",
                ScalarType::Date => "date",
                ScalarType::Timestamp => "timestamp",
                ScalarType::Bytes => "bytes",
            }
            .to_string(),
            FieldType::Selection { .. } => "selection".to_string(),
            FieldType::ForeignKey { model } => format!("fk -> {}", model),
            FieldType::Reverse { model, .. } => format!("reverse <- {}", model),
            FieldType::ManyToMany { model } => format!("m2m <-> {}", model),
        }
    }
}
