//! Editable-text-document views over snapshots

use crate::line_index::LineIndex;
use crate::types::Position;
use weft_core::{Snapshot, SnapshotId};

/// A read-only document view: a snapshot plus its line index.
///
/// Converts between the engine's byte offsets and presentation-layer
/// line/character positions (UTF-16 characters per line, the editor
/// protocol convention). Views are immutable; an edit produces a new
/// snapshot and therefore a new view.
#[derive(Debug, Clone)]
pub struct TextDocument {
    snapshot: Snapshot,
    line_index: LineIndex,
}

impl TextDocument {
    pub fn new(snapshot: Snapshot) -> Self {
        let line_index = LineIndex::new(snapshot.text());
        TextDocument {
            snapshot,
            line_index,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn snapshot_id(&self) -> SnapshotId {
        self.snapshot.id()
    }

    pub fn text(&self) -> &str {
        self.snapshot.text()
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn line_count(&self) -> usize {
        self.line_index.line_count()
    }

    /// Position of a byte offset.
    ///
    /// `None` when the offset is out of bounds or not a character boundary.
    pub fn position_at(&self, offset: usize) -> Option<Position> {
        let line = self.line_index.line_of(offset)?;
        let line_start = self.line_index.line_start(line)?;
        let prefix = self.text().get(line_start..offset)?;
        let character = prefix.encode_utf16().count();
        Some(Position::new(line as u32, character as u32))
    }

    /// Byte offset of a position.
    ///
    /// A `character` past the end of its line clamps to the line end (the
    /// editor-protocol convention); a line past the end of the document
    /// yields `None`.
    pub fn offset_at(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        let line_start = self.line_index.line_start(line)?;
        let line_end = self.line_index.line_end(line)?;
        let line_text = &self.text()[line_start..line_end];

        let mut remaining = position.character as usize;
        for (byte_offset, ch) in line_text.char_indices() {
            let units = ch.len_utf16();
            if remaining < units {
                // Inside a surrogate pair counts as the character's start.
                return Some(line_start + byte_offset);
            }
            remaining -= units;
        }
        Some(line_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(text: &str) -> TextDocument {
        TextDocument::new(Snapshot::new(text))
    }

    #[test]
    fn ascii_round_trip() {
        let doc = document("hello\nworld");
        assert_eq!(doc.position_at(0), Some(Position::new(0, 0)));
        assert_eq!(doc.position_at(7), Some(Position::new(1, 1)));
        assert_eq!(doc.offset_at(Position::new(1, 1)), Some(7));
        assert_eq!(doc.offset_at(Position::new(0, 5)), Some(5));
    }

    #[test]
    fn out_of_bounds() {
        let doc = document("hello");
        assert_eq!(doc.position_at(6), None);
        assert_eq!(doc.offset_at(Position::new(3, 0)), None);
    }

    #[test]
    fn character_clamps_to_line_end() {
        let doc = document("ab\ncd");
        assert_eq!(doc.offset_at(Position::new(0, 99)), Some(2));
    }

    #[test]
    fn multibyte_utf16_columns() {
        // "é" is 2 UTF-8 bytes but 1 UTF-16 unit.
        let doc = document("é x");
        assert_eq!(doc.position_at(2), Some(Position::new(0, 1)));
        assert_eq!(doc.position_at(3), Some(Position::new(0, 2)));
        assert_eq!(doc.offset_at(Position::new(0, 2)), Some(3));
        // Offset inside the multi-byte character is not a boundary.
        assert_eq!(doc.position_at(1), None);
    }

    #[test]
    fn astral_plane_counts_two_units() {
        // "𐐀" is 4 UTF-8 bytes and 2 UTF-16 units.
        let doc = document("𐐀x");
        assert_eq!(doc.position_at(4), Some(Position::new(0, 2)));
        assert_eq!(doc.offset_at(Position::new(0, 2)), Some(4));
        // A position splitting the surrogate pair resolves to the
        // character's start.
        assert_eq!(doc.offset_at(Position::new(0, 1)), Some(0));
    }

    #[test]
    fn empty_document() {
        let doc = document("");
        assert_eq!(doc.position_at(0), Some(Position::new(0, 0)));
        assert_eq!(doc.offset_at(Position::new(0, 0)), Some(0));
        assert_eq!(doc.line_count(), 1);
    }
}
