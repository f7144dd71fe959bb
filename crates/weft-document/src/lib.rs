//! Text-document views over weft snapshots
//!
//! The mapping engine works in absolute byte offsets; editors talk in
//! line/character positions. This crate materializes [`TextDocument`] view
//! objects — a snapshot plus a line index with offset ↔ position conversion
//! (UTF-16 characters, the editor-protocol convention) — and memoizes them
//! per snapshot identity in a [`DocumentViewCache`].

pub mod cache;
pub mod document;
pub mod line_index;
pub mod types;

pub use cache::DocumentViewCache;
pub use document::TextDocument;
pub use line_index::LineIndex;
pub use types::{Position, Range};
