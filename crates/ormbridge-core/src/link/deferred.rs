//! Pending links waiting for their target model.

use std::collections::HashMap;

use ormbridge_proto::FieldDescriptor;
use serde::Serialize;

use crate::catalog::LocalFieldSpec;

/// A field attachment postponed until its relation target is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingLink {
    /// Remote identifier of the model the field belongs to.
    pub origin: String,
    /// The descriptor to replay.
    pub descriptor: FieldDescriptor,
    /// The field, translated when it was first seen.
    pub spec: LocalFieldSpec,
}

/// Pending links queued per missing target model, in arrival order.
#[derive(Debug, Default)]
pub struct DeferredLinkTable {
    pending: HashMap<String, Vec<PendingLink>>,
}

impl DeferredLinkTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `link` until `target` is registered.
    pub fn defer(&mut self, target: &str, link: PendingLink) {
        self.pending
            .entry(target.to_string())
            .or_default()
            .push(link);
    }

    /// Remove and return everything queued for `target`.
    pub fn take(&mut self, target: &str) -> Vec<PendingLink> {
        self.pending.remove(target).unwrap_or_default()
    }

    /// Links queued for `target`.
    pub fn pending_for(&self, target: &str) -> &[PendingLink] {
        self.pending.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Targets with at least one queued link, sorted.
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.pending.keys().cloned().collect();
        targets.sort();
        targets
    }

    /// Total number of queued links.
    pub fn len(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    /// Check if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every queued link.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
