//! Reaction to local model finalization.
//!
//! When the host finishes defining a bridged model, [`SchemaBridge`] asks the
//! remote server for the model's field metadata, translates each descriptor
//! into a local field, and attaches it. Relational fields whose target model
//! has not been finalized yet are parked until it is.

use std::sync::Arc;

use ormbridge_core::proto::FieldDescriptor;
use ormbridge_core::{
    Attachment, DefaultTranslator, FieldTranslator, ModelHandle, PendingLink, PlannedAttachment,
};
use serde::Serialize;
use tracing::{debug, error, info, trace};

use crate::context::BridgeContext;
use crate::error::Error;

/// A field parked until its target model is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeferredField {
    /// Field name.
    pub field: String,
    /// Remote identifier of the missing target.
    pub target: String,
}

/// What happened to one finalized model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    /// Local model name.
    pub model: String,
    /// Remote model identifier.
    pub remote_model: String,
    /// Fields attached to this model.
    pub attached: Vec<String>,
    /// Fields the translator declined.
    pub skipped: Vec<String>,
    /// Fields waiting for another model.
    pub deferred: Vec<DeferredField>,
    /// Previously deferred links, from any model, attached because this one
    /// registered.
    pub replayed: usize,
    /// Field metadata request failure, if any.
    pub fetch_error: Option<String>,
}

/// Result of [`SchemaBridge::on_model_finalized`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The model has no remote identifier.
    Ignored,
    /// No session: the model is left without remote fields.
    Degraded,
    /// The model was registered and its fields processed.
    Linked(LinkReport),
}

impl LinkOutcome {
    /// The report, if the model was linked.
    pub fn report(&self) -> Option<&LinkReport> {
        match self {
            LinkOutcome::Linked(report) => Some(report),
            _ => None,
        }
    }
}

/// Synthesizes local fields from remote metadata.
pub struct SchemaBridge {
    context: Arc<BridgeContext>,
    translator: Arc<dyn FieldTranslator>,
}

impl SchemaBridge {
    /// Create a bridge using [`DefaultTranslator`].
    pub fn new(context: Arc<BridgeContext>) -> Self {
        Self {
            context,
            translator: Arc::new(DefaultTranslator),
        }
    }

    /// Replace the field translator.
    pub fn with_translator(mut self, translator: Arc<dyn FieldTranslator>) -> Self {
        self.translator = translator;
        self
    }

    /// The shared context.
    pub fn context(&self) -> &Arc<BridgeContext> {
        &self.context
    }

    /// Handle the end of `model`'s definition.
    ///
    /// Only a duplicate registration is returned as `Err`. A missing session
    /// or a failed metadata request leaves the model without remote fields.
    pub fn on_model_finalized(&self, model: ModelHandle) -> Result<LinkOutcome, Error> {
        let Some(remote_id) = model.remote_model().map(str::to_string) else {
            trace!(model = %model.name(), "model is not bridged");
            return Ok(LinkOutcome::Ignored);
        };

        // The session check and the registration share one critical section,
        // so a reconnect cannot reset the registry in between.
        let session = {
            let mut state = self.context.lock_state();
            match self.context.session() {
                Some(session) => {
                    state.register(&remote_id, Arc::clone(&model))?;
                    session
                }
                None => {
                    drop(state);
                    error!(
                        model = %model.name(),
                        remote_model = %remote_id,
                        host = ?self.context.host(),
                        "no remote session, model left without remote fields"
                    );
                    return Ok(LinkOutcome::Degraded);
                }
            }
        };

        let mut report = LinkReport {
            model: model.name().to_string(),
            remote_model: remote_id.clone(),
            ..Default::default()
        };

        // Remote call and host translation run without the link lock.
        let mut translated = Vec::new();
        match session.describe_fields(&remote_id, &model.declared_fields()) {
            Ok(fields) => {
                debug!(model = %remote_id, count = fields.len(), "received field metadata");
                for (name, mut descriptor) in fields {
                    descriptor.annotate(&name, &remote_id);
                    let spec = self.translator.translate(&descriptor);
                    translated.push((descriptor, spec));
                }
            }
            Err(e) => {
                error!(model = %remote_id, error = %e, "failed to fetch field metadata");
                report.fetch_error = Some(e.to_string());
            }
        }

        let mut plan = Vec::new();
        {
            let mut state = self.context.lock_state();
            for (descriptor, spec) in translated {
                let name = descriptor.name.clone();
                match state.attach_or_defer(&remote_id, descriptor, spec, &mut plan)? {
                    Attachment::Skipped => report.skipped.push(name),
                    Attachment::Attached => report.attached.push(name),
                    Attachment::Deferred { target } => {
                        report.deferred.push(DeferredField { field: name, target })
                    }
                }
            }
            report.replayed = state.resolve_deferred(&remote_id, &mut plan)?;
        }
        apply(plan);

        info!(
            model = %remote_id,
            attached = report.attached.len(),
            skipped = report.skipped.len(),
            deferred = report.deferred.len(),
            replayed = report.replayed,
            "model linked"
        );
        Ok(LinkOutcome::Linked(report))
    }

    /// Attach `descriptor` to the registered model `origin`, or park it until
    /// its relation target is registered.
    pub fn attach_or_defer(
        &self,
        origin: &str,
        descriptor: FieldDescriptor,
    ) -> Result<Attachment, Error> {
        let spec = self.translator.translate(&descriptor);
        let mut plan = Vec::new();
        let attachment = self
            .context
            .lock_state()
            .attach_or_defer(origin, descriptor, spec, &mut plan)?;
        apply(plan);
        Ok(attachment)
    }

    /// Links still waiting for a target that was never finalized.
    pub fn pending_links(&self) -> Vec<PendingLink> {
        let state = self.context.lock_state();
        let deferred = state.deferred();
        deferred
            .targets()
            .iter()
            .flat_map(|target| deferred.pending_for(target).iter().cloned())
            .collect()
    }
}

/// Run host model callbacks. Must be called with the link lock released.
fn apply(plan: Vec<PlannedAttachment>) {
    for attachment in plan {
        attachment.apply();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_report() {
        assert!(LinkOutcome::Ignored.report().is_none());
        assert!(LinkOutcome::Degraded.report().is_none());

        let report = LinkReport {
            model: "Partner".into(),
            remote_model: "res.partner".into(),
            ..Default::default()
        };
        assert_eq!(
            LinkOutcome::Linked(report.clone()).report(),
            Some(&report)
        );
    }

    #[test]
    fn test_unconnected_bridge_has_no_pending_links() {
        let bridge = SchemaBridge::new(Arc::new(BridgeContext::new()));
        assert!(bridge.pending_links().is_empty());
    }
}
