//! Snapshot-identity-keyed memoization of document views

use crate::document::TextDocument;
use std::collections::HashMap;
use std::sync::Arc;
use weft_core::{Snapshot, SnapshotId};

/// Materializes [`TextDocument`] views lazily, memoized by snapshot
/// identity.
///
/// Two snapshots with identical text but different identities get distinct
/// entries, matching the registry's change-detection policy. Entries are
/// evicted explicitly when the owning record is deleted or regenerated;
/// nothing here extends the lifetime of registry state.
#[derive(Default)]
pub struct DocumentViewCache {
    views: HashMap<SnapshotId, Arc<TextDocument>>,
}

impl DocumentViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The view for a snapshot, building it on first access.
    pub fn get(&mut self, snapshot: &Snapshot) -> Arc<TextDocument> {
        self.views
            .entry(snapshot.id())
            .or_insert_with(|| Arc::new(TextDocument::new(snapshot.clone())))
            .clone()
    }

    /// Drop the view for one snapshot identity.
    pub fn evict(&mut self, id: SnapshotId) {
        self.views.remove(&id);
    }

    /// Drop every view whose snapshot identity is not in `live`.
    pub fn retain_only(&mut self, live: &std::collections::HashSet<SnapshotId>) {
        self.views.retain(|id, _| live.contains(id));
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
