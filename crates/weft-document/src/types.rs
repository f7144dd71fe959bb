//! Position types for the presentation boundary

use serde::{Deserialize, Serialize};

/// A zero-based line/character position.
///
/// `character` counts UTF-16 code units within the line, matching editor
/// protocols. Byte offsets never appear in this type; conversion lives in
/// [`TextDocument`](crate::TextDocument).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

/// A half-open position range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Range { start, end }
    }

    /// An empty range at a single position.
    pub fn point(position: Position) -> Self {
        Range {
            start: position,
            end: position,
        }
    }
}
