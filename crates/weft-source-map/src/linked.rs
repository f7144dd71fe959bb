//! Same-document position links for spans that must be edited together

use crate::capabilities::CapabilitySet;
use crate::mapping::Mapping;
use crate::source_map::SourceMap;
use std::sync::Arc;

/// Mirror links between offsets of a single document.
///
/// Built from same-document mappings where both sides index the same text —
/// e.g. a template interpolation and the script declaration it mirrors,
/// which a rename must edit together. There is no source/generated
/// distinction here; a lookup on either side of a segment yields the
/// offsets on the other side, so linkage is symmetric: if A reports B
/// linked, B reports A linked.
pub struct LinkedPositionMap {
    map: SourceMap,
}

impl LinkedPositionMap {
    pub fn new(mappings: impl Into<Arc<[Mapping]>>) -> Self {
        LinkedPositionMap {
            map: SourceMap::new(mappings),
        }
    }

    /// Every offset mutually linked to `offset` via a containing segment.
    pub fn linked_offsets(&self, offset: usize) -> Vec<usize> {
        let all = |_: CapabilitySet| true;
        let mut linked: Vec<usize> = self
            .map
            .to_generated_offsets(offset, all)
            .iter()
            .map(|m| m.offset)
            .collect();
        linked.extend(self.map.to_source_offsets(offset, all).iter().map(|m| m.offset));
        linked
    }

    /// The underlying same-document mappings.
    pub fn mappings(&self) -> &[Mapping] {
        self.map.mappings()
    }
}

impl std::fmt::Debug for LinkedPositionMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedPositionMap")
            .field("mappings", &self.map.mappings())
            .finish()
    }
}
