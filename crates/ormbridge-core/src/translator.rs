//! Translation of remote field descriptors into local field specs.

use ormbridge_proto::{FieldDescriptor, RelationKind};

use crate::catalog::{FieldType, LocalFieldSpec, ScalarType};

/// Maps a remote descriptor to a local field, or `None` to skip it.
///
/// Called once per descriptor, without any bridge lock held. A deferred link
/// keeps the field produced here and is not translated again on replay.
pub trait FieldTranslator: Send + Sync {
    /// Translate one descriptor.
    fn translate(&self, descriptor: &FieldDescriptor) -> Option<LocalFieldSpec>;
}

impl<F> FieldTranslator for F
where
    F: Fn(&FieldDescriptor) -> Option<LocalFieldSpec> + Send + Sync,
{
    fn translate(&self, descriptor: &FieldDescriptor) -> Option<LocalFieldSpec> {
        self(descriptor)
    }
}

/// Translator for the remote server's built-in type tags.
///
/// Unknown tags (`reference`, `serialized`, computed-only kinds, ...) and
/// relational fields without a target are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTranslator;

impl FieldTranslator for DefaultTranslator {
    fn translate(&self, descriptor: &FieldDescriptor) -> Option<LocalFieldSpec> {
        let field_type = match descriptor.relation() {
            Some(relation) => {
                let model = relation.target.to_string();
                match relation.kind {
                    RelationKind::ManyToOne => FieldType::ForeignKey { model },
                    RelationKind::OneToMany => FieldType::Reverse {
                        model,
                        inverse: descriptor.relation_field.clone(),
                    },
                    RelationKind::ManyToMany => FieldType::ManyToMany { model },
                }
            }
            None if descriptor.is_relational() => return None,
            None => scalar_type(descriptor)?,
        };

        let mut spec = if descriptor.required {
            LocalFieldSpec::new(field_type)
        } else {
            LocalFieldSpec::optional(field_type)
        };
        spec.label = descriptor.label.clone();
        spec.help = descriptor.help.clone();
        spec.readonly = descriptor.readonly;
        Some(spec)
    }
}

fn scalar_type(descriptor: &FieldDescriptor) -> Option<FieldType> {
    let scalar = match descriptor.type_tag.as_str() {
        "boolean" => ScalarType::Bool,
        "integer" => ScalarType::Integer,
        "float" => ScalarType::Float,
        "monetary" => ScalarType::Monetary,
        "char" => ScalarType::Char {
            max_length: descriptor.size.filter(|&n| n > 0),
        },
        "text" => ScalarType::Text,
        "html" => ScalarType::Html,
        "date" => ScalarType::Date,
        "datetime" => ScalarType::Timestamp,
        "binary" => ScalarType::Bytes,
        "selection" => {
            return Some(FieldType::Selection {
                variants: descriptor
                    .selection
                    .iter()
                    .map(|(value, _)| value.clone())
                    .collect(),
            })
        }
        _ => return None,
    };
    Some(FieldType::Scalar(scalar))
}
