//! Bidirectional position translation over a set of mappings

use crate::capabilities::CapabilitySet;
use crate::mapping::Mapping;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// One successful translation of an offset.
#[derive(Debug, Clone, Copy)]
pub struct MappedOffset<'a> {
    /// The offset in the other coordinate space.
    pub offset: usize,
    /// The mapping whose segment matched.
    pub mapping: &'a Mapping,
    /// Index of the matched segment within that mapping.
    pub segment: usize,
}

/// Translates offsets and ranges between the source and generated spaces of
/// one mapping set.
///
/// Multiple mappings may legitimately overlap (e.g. a wide navigation span
/// with a narrower completion span nested inside); every match is returned,
/// in mapping insertion order, and callers wanting a single answer take the
/// first. An offset with no match is a normal silent no-result, since
/// unmapped regions (pure boilerplate in generated code) are expected.
///
/// Lookup goes through lazily built per-direction indexes (segments sorted
/// by start, with a running maximum end for early exit), so a map queried on
/// every keystroke does not rescan all segments.
pub struct SourceMap {
    mappings: Arc<[Mapping]>,
    by_source: OnceCell<SegmentIndex>,
    by_generated: OnceCell<SegmentIndex>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    ToSource,
    ToGenerated,
}

impl SourceMap {
    /// Build a translator over a mapping set.
    ///
    /// Mappings are expected to be validated before acceptance (see
    /// [`Mapping::validate`]); this is debug-asserted here.
    pub fn new(mappings: impl Into<Arc<[Mapping]>>) -> Self {
        let mappings = mappings.into();
        debug_assert!(mappings.iter().all(|m| m.validate().is_ok()));
        SourceMap {
            mappings,
            by_source: OnceCell::new(),
            by_generated: OnceCell::new(),
        }
    }

    /// The underlying mappings, in insertion order.
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Translate a generated offset to every matching source offset.
    pub fn to_source_offsets(
        &self,
        offset: usize,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Vec<MappedOffset<'_>> {
        self.query(offset, Direction::ToSource, &filter)
    }

    /// Translate a source offset to every matching generated offset.
    pub fn to_generated_offsets(
        &self,
        offset: usize,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Vec<MappedOffset<'_>> {
        self.query(offset, Direction::ToGenerated, &filter)
    }

    /// First source offset for a generated offset, if any.
    pub fn to_source_offset(
        &self,
        offset: usize,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Option<usize> {
        self.to_source_offsets(offset, filter).first().map(|m| m.offset)
    }

    /// First generated offset for a source offset, if any.
    pub fn to_generated_offset(
        &self,
        offset: usize,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Option<usize> {
        self.to_generated_offsets(offset, filter).first().map(|m| m.offset)
    }

    /// Translate a generated range to every source range with a joint
    /// translation.
    ///
    /// For each translation of `start`, the end is first looked up within
    /// the same mapping; starts whose end has no translation there are
    /// retried against the translations anchored from `end` outward. A range
    /// with no joint translation yields nothing — absence means "this range
    /// has no representation in the other space", not an error.
    pub fn to_source_ranges(
        &self,
        start: usize,
        end: usize,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Vec<(usize, usize)> {
        self.ranges(start, end, Direction::ToSource, &filter)
    }

    /// Translate a source range to every generated range with a joint
    /// translation.
    pub fn to_generated_ranges(
        &self,
        start: usize,
        end: usize,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Vec<(usize, usize)> {
        self.ranges(start, end, Direction::ToGenerated, &filter)
    }

    /// First source range for a generated range, if any.
    pub fn to_source_range(
        &self,
        start: usize,
        end: usize,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Option<(usize, usize)> {
        self.to_source_ranges(start, end, filter).first().copied()
    }

    /// First generated range for a source range, if any.
    pub fn to_generated_range(
        &self,
        start: usize,
        end: usize,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Option<(usize, usize)> {
        self.to_generated_ranges(start, end, filter).first().copied()
    }

    fn query<F>(&self, offset: usize, direction: Direction, filter: &F) -> Vec<MappedOffset<'_>>
    where
        F: Fn(CapabilitySet) -> bool,
    {
        let index = match direction {
            // Containment is checked on the side we translate *from*.
            Direction::ToSource => self.generated_index(),
            Direction::ToGenerated => self.source_index(),
        };
        let mut matched: Vec<SegmentRef> = index
            .containing(offset)
            .filter(|entry| filter(self.mappings[entry.mapping].data))
            .collect();
        // Report matches in mapping insertion order so "take the first" is
        // stable regardless of segment layout.
        matched.sort_by_key(|entry| (entry.mapping, entry.segment));
        matched
            .into_iter()
            .map(|entry| {
                let mapping = &self.mappings[entry.mapping];
                let (target_base, target_length) = match direction {
                    Direction::ToSource => (
                        mapping.source_offsets[entry.segment],
                        mapping.lengths[entry.segment],
                    ),
                    Direction::ToGenerated => (
                        mapping.generated_offsets[entry.segment],
                        mapping.generated_length(entry.segment),
                    ),
                };
                MappedOffset {
                    // The delta never exceeds the target side's length; a
                    // zero-length anchor collapses the whole span onto it.
                    offset: target_base + (offset - entry.start).min(target_length),
                    mapping,
                    segment: entry.segment,
                }
            })
            .collect()
    }

    fn ranges<F>(
        &self,
        start: usize,
        end: usize,
        direction: Direction,
        filter: &F,
    ) -> Vec<(usize, usize)>
    where
        F: Fn(CapabilitySet) -> bool,
    {
        let mut out = Vec::new();
        let mut unpaired = Vec::new();
        for start_match in self.query(start, direction, filter) {
            let end_in_same_mapping = match direction {
                Direction::ToSource => start_match.mapping.translate_to_source(end),
                Direction::ToGenerated => start_match.mapping.translate_to_generated(end),
            };
            match end_in_same_mapping {
                Some(paired_end) => out.push((start_match.offset, paired_end)),
                None => unpaired.push(start_match.offset),
            }
        }
        if !unpaired.is_empty() {
            let end_matches = self.query(end, direction, filter);
            for failed_start in unpaired {
                for end_match in &end_matches {
                    out.push((failed_start, end_match.offset));
                }
            }
        }
        out
    }

    fn source_index(&self) -> &SegmentIndex {
        self.by_source
            .get_or_init(|| SegmentIndex::build(&self.mappings, Side::Source))
    }

    fn generated_index(&self) -> &SegmentIndex {
        self.by_generated
            .get_or_init(|| SegmentIndex::build(&self.mappings, Side::Generated))
    }
}

impl std::fmt::Debug for SourceMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceMap")
            .field("mappings", &self.mappings)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Source,
    Generated,
}

/// Segments of all mappings, sorted by start offset on one side, with a
/// running maximum end so a containment query can stop scanning early even
/// when segments overlap.
struct SegmentIndex {
    entries: Vec<SegmentRef>,
    max_end: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
struct SegmentRef {
    start: usize,
    end: usize,
    mapping: usize,
    segment: usize,
}

impl SegmentIndex {
    fn build(mappings: &[Mapping], side: Side) -> Self {
        let mut entries = Vec::new();
        for (mapping_index, mapping) in mappings.iter().enumerate() {
            for segment in 0..mapping.segment_count() {
                let (start, length) = match side {
                    Side::Source => (mapping.source_offsets[segment], mapping.lengths[segment]),
                    Side::Generated => (
                        mapping.generated_offsets[segment],
                        mapping.generated_length(segment),
                    ),
                };
                entries.push(SegmentRef {
                    start,
                    end: start + length,
                    mapping: mapping_index,
                    segment,
                });
            }
        }
        entries.sort_by_key(|entry| entry.start);
        let mut max_end = Vec::with_capacity(entries.len());
        let mut running = 0;
        for entry in &entries {
            running = running.max(entry.end);
            max_end.push(running);
        }
        SegmentIndex { entries, max_end }
    }

    /// All segments whose `[start, end]` range contains `offset`, end
    /// inclusive.
    fn containing(&self, offset: usize) -> impl Iterator<Item = SegmentRef> + '_ {
        let upper = self.entries.partition_point(|entry| entry.start <= offset);
        (0..upper)
            .rev()
            // max_end is nondecreasing, so once it drops below the offset no
            // earlier segment can reach it.
            .take_while(move |&i| self.max_end[i] >= offset)
            .filter(move |&i| self.entries[i].end >= offset)
            .map(move |i| self.entries[i])
    }
}
