//! Combined linking state.
//!
//! The registry and the deferred table are read and written together: a link
//! is deferred only if its target is unregistered, and a target's queue is
//! drained right after it registers. Both live in one [`LinkState`] so a single
//! lock covers each check-then-act step.
//!
//! Deciding and applying are separate. [`LinkState::attach_or_defer`] only
//! records [`PlannedAttachment`]s; the caller applies them once the lock is
//! released, so host model code never runs under it.

use std::fmt;

use ormbridge_proto::FieldDescriptor;
use tracing::{debug, trace};

use super::deferred::{DeferredLinkTable, PendingLink};
use super::registry::ModelRegistry;
use crate::catalog::LocalFieldSpec;
use crate::error::Error;
use crate::model::{ModelHandle, ReverseLink};

/// What happened to one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// The translator declined the field.
    Skipped,
    /// The field was planned for attachment to its origin model.
    Attached,
    /// The field waits for `target` to be registered.
    Deferred {
        /// Remote identifier of the missing target.
        target: String,
    },
}

/// A field attachment decided under the link lock.
pub struct PlannedAttachment {
    /// Model receiving the field.
    pub model: ModelHandle,
    /// Field name.
    pub name: String,
    /// Translated field.
    pub spec: LocalFieldSpec,
    /// Target model and the reverse link it records, for relational fields.
    pub reverse: Option<(ModelHandle, ReverseLink)>,
}

impl PlannedAttachment {
    /// Attach the field and record the reverse link.
    pub fn apply(self) {
        self.model.attach_field(&self.name, self.spec);
        if let Some((target, link)) = self.reverse {
            target.add_reverse_link(link);
        }
        trace!(model = %self.model.name(), field = %self.name, "field attached");
    }
}

impl fmt::Debug for PlannedAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannedAttachment")
            .field("model", &self.model.name())
            .field("name", &self.name)
            .field("spec", &self.spec)
            .field("reverse", &self.reverse.as_ref().map(|(_, link)| link))
            .finish()
    }
}

/// Model registry plus deferred links.
#[derive(Debug, Default)]
pub struct LinkState {
    registry: ModelRegistry,
    deferred: DeferredLinkTable,
}

impl LinkState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `remote_id` to `model`.
    pub fn register(&mut self, remote_id: &str, model: ModelHandle) -> Result<(), Error> {
        self.registry.register(remote_id, model)?;
        debug!(model = %remote_id, "registered bridged model");
        Ok(())
    }

    /// Plan the attachment of `descriptor`, already translated into `spec`,
    /// to `origin`, or queue it if its relation target is not registered yet.
    ///
    /// A `None` spec is a skipped field and is never queued.
    pub fn attach_or_defer(
        &mut self,
        origin: &str,
        descriptor: FieldDescriptor,
        spec: Option<LocalFieldSpec>,
        plan: &mut Vec<PlannedAttachment>,
    ) -> Result<Attachment, Error> {
        let Some(spec) = spec else {
            trace!(model = %origin, field = %descriptor.name, kind = %descriptor.type_tag, "field skipped");
            return Ok(Attachment::Skipped);
        };

        let model = self
            .registry
            .get(origin)
            .cloned()
            .ok_or_else(|| Error::UnknownOrigin {
                model: origin.to_string(),
            })?;

        let relation = descriptor
            .relation()
            .map(|r| (r.target.to_string(), r.kind));

        let reverse = match relation {
            Some((target, kind)) => match self.registry.get(&target).cloned() {
                Some(target_model) => Some((
                    target_model,
                    ReverseLink {
                        from_model: origin.to_string(),
                        field: descriptor.name.clone(),
                        kind,
                    },
                )),
                None => {
                    debug!(model = %origin, field = %descriptor.name, target = %target, "deferring link");
                    self.deferred.defer(
                        &target,
                        PendingLink {
                            origin: origin.to_string(),
                            descriptor,
                            spec,
                        },
                    );
                    return Ok(Attachment::Deferred { target });
                }
            },
            None => None,
        };

        plan.push(PlannedAttachment {
            model,
            name: descriptor.name,
            spec,
            reverse,
        });
        Ok(Attachment::Attached)
    }

    /// Replay every link queued for `target`. Returns the number planned.
    pub fn resolve_deferred(
        &mut self,
        target: &str,
        plan: &mut Vec<PlannedAttachment>,
    ) -> Result<usize, Error> {
        let pending = self.deferred.take(target);
        let mut attached = 0;

        for link in pending {
            debug!(model = %link.origin, field = %link.descriptor.name, target = %target, "replaying deferred link");
            if self.attach_or_defer(&link.origin, link.descriptor, Some(link.spec), plan)?
                == Attachment::Attached
            {
                attached += 1;
            }
        }

        Ok(attached)
    }

    /// Forget every registration and pending link.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.deferred.clear();
    }

    /// The model registry.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// The deferred link table.
    pub fn deferred(&self) -> &DeferredLinkTable {
        &self.deferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldType;
    use crate::model::BridgedModel;
    use crate::translator::{DefaultTranslator, FieldTranslator};
    use ormbridge_proto::RelationKind;

    /// Translate, plan and apply, the way the bridge does.
    fn attach(state: &mut LinkState, origin: &str, descriptor: FieldDescriptor) -> Attachment {
        let spec = DefaultTranslator.translate(&descriptor);
        let mut plan = Vec::new();
        let outcome = state.attach_or_defer(origin, descriptor, spec, &mut plan).unwrap();
        plan.into_iter().for_each(PlannedAttachment::apply);
        outcome
    }

    #[test]
    fn test_immediate_attach() {
        let mut state = LinkState::new();
        let partner = BridgedModel::builder("Partner", "res.partner").build();
        state.register("res.partner", partner.clone()).unwrap();

        let outcome = attach(&mut state, "res.partner", FieldDescriptor::new("name", "char"));

        assert_eq!(outcome, Attachment::Attached);
        assert!(partner.has_field("name"));
    }

    #[test]
    fn test_plan_is_applied_by_caller() {
        let mut state = LinkState::new();
        let partner = BridgedModel::builder("Partner", "res.partner").build();
        state.register("res.partner", partner.clone()).unwrap();

        let descriptor = FieldDescriptor::many_to_one("parent_id", "res.partner");
        let spec = DefaultTranslator.translate(&descriptor);
        let mut plan = Vec::new();
        state
            .attach_or_defer("res.partner", descriptor, spec, &mut plan)
            .unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(partner.field_count(), 0);
        assert!(partner.reverse_links().is_empty());

        plan.into_iter().for_each(PlannedAttachment::apply);

        assert!(partner.has_field("parent_id"));
        assert_eq!(partner.reverse_links().len(), 1);
    }

    #[test]
    fn test_forward_reference_is_deferred_then_replayed() {
        let mut state = LinkState::new();
        let order = BridgedModel::builder("Order", "sale.order").build();
        let partner = BridgedModel::builder("Partner", "res.partner").build();

        state.register("sale.order", order.clone()).unwrap();
        let outcome = attach(
            &mut state,
            "sale.order",
            FieldDescriptor::many_to_one("partner_id", "res.partner"),
        );

        assert_eq!(
            outcome,
            Attachment::Deferred {
                target: "res.partner".into()
            }
        );
        assert!(!order.has_field("partner_id"));
        assert_eq!(state.deferred().pending_for("res.partner").len(), 1);

        state.register("res.partner", partner.clone()).unwrap();
        let mut plan = Vec::new();
        let replayed = state.resolve_deferred("res.partner", &mut plan).unwrap();
        plan.into_iter().for_each(PlannedAttachment::apply);

        assert_eq!(replayed, 1);
        assert!(state.deferred().is_empty());
        assert_eq!(
            order.field("partner_id").unwrap().field_type,
            FieldType::foreign_key("res.partner")
        );
        assert_eq!(
            partner.reverse_links(),
            vec![ReverseLink {
                from_model: "sale.order".into(),
                field: "partner_id".into(),
                kind: RelationKind::ManyToOne,
            }]
        );
    }

    #[test]
    fn test_many_to_many_is_deferred_like_other_kinds() {
        let mut state = LinkState::new();
        let order = BridgedModel::builder("Order", "sale.order").build();
        state.register("sale.order", order.clone()).unwrap();

        let outcome = attach(
            &mut state,
            "sale.order",
            FieldDescriptor::new("tag_ids", "many2many").with_relation("crm.tag"),
        );
        assert_eq!(
            outcome,
            Attachment::Deferred {
                target: "crm.tag".into()
            }
        );

        let tag = BridgedModel::builder("Tag", "crm.tag").build();
        state.register("crm.tag", tag.clone()).unwrap();
        let mut plan = Vec::new();
        assert_eq!(state.resolve_deferred("crm.tag", &mut plan).unwrap(), 1);
        plan.into_iter().for_each(PlannedAttachment::apply);

        assert_eq!(
            order.field("tag_ids").unwrap().field_type,
            FieldType::ManyToMany {
                model: "crm.tag".into()
            }
        );
        assert_eq!(tag.reverse_links()[0].kind, RelationKind::ManyToMany);
    }

    #[test]
    fn test_self_reference_attaches_immediately() {
        let mut state = LinkState::new();
        let partner = BridgedModel::builder("Partner", "res.partner").build();
        state.register("res.partner", partner.clone()).unwrap();

        let outcome = attach(
            &mut state,
            "res.partner",
            FieldDescriptor::many_to_one("parent_id", "res.partner"),
        );

        assert_eq!(outcome, Attachment::Attached);
        assert_eq!(partner.reverse_links().len(), 1);
    }

    #[test]
    fn test_skipped_field_is_never_deferred() {
        let mut state = LinkState::new();
        let order = BridgedModel::builder("Order", "sale.order").build();
        state.register("sale.order", order.clone()).unwrap();

        let mut plan = Vec::new();
        let outcome = state
            .attach_or_defer(
                "sale.order",
                FieldDescriptor::many_to_one("partner_id", "res.partner"),
                None,
                &mut plan,
            )
            .unwrap();

        assert_eq!(outcome, Attachment::Skipped);
        assert!(plan.is_empty());
        assert!(state.deferred().is_empty());
        assert_eq!(order.field_count(), 0);
    }

    #[test]
    fn test_unknown_origin() {
        let mut state = LinkState::new();
        let descriptor = FieldDescriptor::new("name", "char");
        let spec = DefaultTranslator.translate(&descriptor);

        let err = state
            .attach_or_defer("sale.order", descriptor, spec, &mut Vec::new())
            .unwrap_err();

        assert!(matches!(err, Error::UnknownOrigin { .. }));
    }

    #[test]
    fn test_reset() {
        let mut state = LinkState::new();
        let order = BridgedModel::builder("Order", "sale.order").build();
        state.register("sale.order", order).unwrap();
        attach(
            &mut state,
            "sale.order",
            FieldDescriptor::many_to_one("partner_id", "res.partner"),
        );

        state.reset();

        assert!(state.registry().is_empty());
        assert!(state.deferred().is_empty());
    }
}
