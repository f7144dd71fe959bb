//! Immutable, identity-tracked text snapshots

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SNAPSHOT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one [`Snapshot`].
///
/// Every cache and change-detection decision in the system keys on this id,
/// never on text content: two snapshots with identical text but different
/// ids are distinct everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId(u64);

/// An immutable, versioned text handle.
///
/// Cloning shares the text and the identity. A new identity is only minted
/// by [`Snapshot::new`], so "the document changed" is exactly "a snapshot
/// with a different id was stored".
#[derive(Debug, Clone)]
pub struct Snapshot {
    id: SnapshotId,
    text: Arc<str>,
}

impl Snapshot {
    /// Create a snapshot with a fresh identity.
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Snapshot {
            id: SnapshotId(NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed)),
            text: text.into(),
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Identity equality, not content equality.
impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Snapshot {}

impl std::hash::Hash for Snapshot {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let snapshot = Snapshot::new("hello");
        let clone = snapshot.clone();
        assert_eq!(snapshot, clone);
        assert_eq!(snapshot.id(), clone.id());
    }

    #[test]
    fn identical_text_distinct_identity() {
        let first = Snapshot::new("hello");
        let second = Snapshot::new("hello");
        assert_eq!(first.text(), second.text());
        assert_ne!(first, second);
    }
}
