//! The mapping primitive: offset-range correspondences between two texts

use crate::capabilities::CapabilitySet;
use crate::error::{MappingError, Result};
use serde::{Deserialize, Serialize};

/// An ordered correspondence between source offset ranges and generated
/// offset ranges.
///
/// Each index `i` describes one segment: source range
/// `[source_offsets[i], source_offsets[i] + lengths[i])` corresponds to
/// generated range `[generated_offsets[i], generated_offsets[i] + glen(i))`
/// where `glen(i)` is `generated_lengths[i]` when present and `lengths[i]`
/// otherwise. A segment whose two sides differ in length models codegen
/// expansion or contraction; a zero-length side is an insertion anchor.
///
/// Offsets are absolute byte offsets into the respective full text buffers.
/// Segment order is preserved for stable iteration; lookups do not depend
/// on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub source_offsets: Vec<usize>,
    pub generated_offsets: Vec<usize>,
    pub lengths: Vec<usize>,
    /// Generated-side lengths, when they differ from the source-side ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_lengths: Option<Vec<usize>>,
    /// Which feature classes may cross this correspondence.
    pub data: CapabilitySet,
}

impl Mapping {
    /// Create a mapping from parallel segment arrays.
    pub fn new(
        source_offsets: Vec<usize>,
        generated_offsets: Vec<usize>,
        lengths: Vec<usize>,
        data: CapabilitySet,
    ) -> Self {
        Mapping {
            source_offsets,
            generated_offsets,
            lengths,
            generated_lengths: None,
            data,
        }
    }

    /// Create a single-segment mapping.
    pub fn one(
        source_offset: usize,
        generated_offset: usize,
        length: usize,
        data: CapabilitySet,
    ) -> Self {
        Mapping::new(vec![source_offset], vec![generated_offset], vec![length], data)
    }

    /// Attach generated-side lengths that differ from the source-side ones.
    pub fn with_generated_lengths(mut self, generated_lengths: Vec<usize>) -> Self {
        self.generated_lengths = Some(generated_lengths);
        self
    }

    /// Number of segments in this mapping.
    pub fn segment_count(&self) -> usize {
        self.lengths.len()
    }

    /// Generated-side length of segment `i`.
    pub fn generated_length(&self, i: usize) -> usize {
        match &self.generated_lengths {
            Some(lengths) => lengths[i],
            None => self.lengths[i],
        }
    }

    /// Check the parallel-array invariant.
    ///
    /// `source_offsets`, `generated_offsets` and `lengths` must agree in
    /// length, as must `generated_lengths` when present.
    pub fn validate(&self) -> Result<()> {
        if self.source_offsets.len() != self.generated_offsets.len()
            || self.source_offsets.len() != self.lengths.len()
        {
            return Err(MappingError::SegmentArityMismatch {
                source_offsets: self.source_offsets.len(),
                generated_offsets: self.generated_offsets.len(),
                lengths: self.lengths.len(),
            });
        }
        if let Some(generated_lengths) = &self.generated_lengths {
            if generated_lengths.len() != self.lengths.len() {
                return Err(MappingError::GeneratedLengthsMismatch {
                    generated_lengths: generated_lengths.len(),
                    segments: self.lengths.len(),
                });
            }
        }
        Ok(())
    }

    /// Translate a source offset to a generated offset within this mapping.
    ///
    /// Scans segments in order; the first segment whose source range
    /// contains `offset` (inclusive of the range end, so insertion anchors
    /// resolve) wins. The delta into the segment is clamped to the
    /// generated side's length.
    pub fn translate_to_generated(&self, offset: usize) -> Option<usize> {
        for i in 0..self.segment_count() {
            let start = self.source_offsets[i];
            if offset >= start && offset <= start + self.lengths[i] {
                let delta = (offset - start).min(self.generated_length(i));
                return Some(self.generated_offsets[i] + delta);
            }
        }
        None
    }

    /// Translate a generated offset to a source offset within this mapping.
    ///
    /// Mirror of [`translate_to_generated`](Self::translate_to_generated):
    /// containment is checked against the generated side, the delta is
    /// clamped to the source side's length.
    pub fn translate_to_source(&self, offset: usize) -> Option<usize> {
        for i in 0..self.segment_count() {
            let start = self.generated_offsets[i];
            if offset >= start && offset <= start + self.generated_length(i) {
                let delta = (offset - start).min(self.lengths[i]);
                return Some(self.source_offsets[i] + delta);
            }
        }
        None
    }
}
