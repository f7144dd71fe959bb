//! Translators paired with their document views

use std::sync::Arc;
use weft_document::{Position, Range, TextDocument};
use weft_source_map::{CapabilitySet, LinkedPositionMap, SourceMap};

/// A source/virtual document pair with the translator between them.
///
/// Adds the presentation layer on top of [`SourceMap`]: positions go
/// through the documents' offset conversion, offsets through the shared
/// translator. Instances are cheap handles; the documents and the map are
/// shared with the service caches.
#[derive(Clone)]
pub struct DocumentMap {
    source_document: Arc<TextDocument>,
    virtual_document: Arc<TextDocument>,
    map: Arc<SourceMap>,
}

impl DocumentMap {
    pub(crate) fn new(
        source_document: Arc<TextDocument>,
        virtual_document: Arc<TextDocument>,
        map: Arc<SourceMap>,
    ) -> Self {
        DocumentMap {
            source_document,
            virtual_document,
            map,
        }
    }

    pub fn source_document(&self) -> &Arc<TextDocument> {
        &self.source_document
    }

    pub fn virtual_document(&self) -> &Arc<TextDocument> {
        &self.virtual_document
    }

    /// The shared offset translator.
    pub fn map(&self) -> &Arc<SourceMap> {
        &self.map
    }

    /// First source position for a virtual-document position.
    pub fn source_position(
        &self,
        position: Position,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Option<Position> {
        self.source_positions(position, filter).into_iter().next()
    }

    /// Every source position for a virtual-document position.
    pub fn source_positions(
        &self,
        position: Position,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Vec<Position> {
        let Some(offset) = self.virtual_document.offset_at(position) else {
            return Vec::new();
        };
        self.map
            .to_source_offsets(offset, filter)
            .iter()
            .filter_map(|mapped| self.source_document.position_at(mapped.offset))
            .collect()
    }

    /// First virtual-document position for a source position.
    pub fn generated_position(
        &self,
        position: Position,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Option<Position> {
        self.generated_positions(position, filter).into_iter().next()
    }

    /// Every virtual-document position for a source position.
    pub fn generated_positions(
        &self,
        position: Position,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Vec<Position> {
        let Some(offset) = self.source_document.offset_at(position) else {
            return Vec::new();
        };
        self.map
            .to_generated_offsets(offset, filter)
            .iter()
            .filter_map(|mapped| self.virtual_document.position_at(mapped.offset))
            .collect()
    }

    /// First source range for a virtual-document range.
    pub fn source_range(
        &self,
        range: Range,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Option<Range> {
        let start = self.virtual_document.offset_at(range.start)?;
        let end = self.virtual_document.offset_at(range.end)?;
        let (mapped_start, mapped_end) = self.map.to_source_range(start, end, filter)?;
        Some(Range::new(
            self.source_document.position_at(mapped_start)?,
            self.source_document.position_at(mapped_end)?,
        ))
    }

    /// First virtual-document range for a source range.
    pub fn generated_range(
        &self,
        range: Range,
        filter: impl Fn(CapabilitySet) -> bool,
    ) -> Option<Range> {
        let start = self.source_document.offset_at(range.start)?;
        let end = self.source_document.offset_at(range.end)?;
        let (mapped_start, mapped_end) = self.map.to_generated_range(start, end, filter)?;
        Some(Range::new(
            self.virtual_document.position_at(mapped_start)?,
            self.virtual_document.position_at(mapped_end)?,
        ))
    }
}

/// A virtual document with its same-document mirror links.
#[derive(Clone)]
pub struct LinkedDocumentMap {
    document: Arc<TextDocument>,
    map: Arc<LinkedPositionMap>,
}

impl LinkedDocumentMap {
    pub(crate) fn new(document: Arc<TextDocument>, map: Arc<LinkedPositionMap>) -> Self {
        LinkedDocumentMap { document, map }
    }

    pub fn document(&self) -> &Arc<TextDocument> {
        &self.document
    }

    pub fn map(&self) -> &Arc<LinkedPositionMap> {
        &self.map
    }

    /// Every position mutually linked to `position`.
    pub fn linked_positions(&self, position: Position) -> Vec<Position> {
        let Some(offset) = self.document.offset_at(position) else {
            return Vec::new();
        };
        self.map
            .linked_offsets(offset)
            .into_iter()
            .filter_map(|linked| self.document.position_at(linked))
            .collect()
    }
}
