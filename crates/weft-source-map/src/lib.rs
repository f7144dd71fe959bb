//! Offset mapping between source and generated documents
//!
//! This crate provides the mapping primitives for projected documents: a
//! source file (e.g. a component file mixing markup and script) is projected
//! into generated documents, and every span of generated text that
//! corresponds to a span of source text is recorded as a [`Mapping`].
//!
//! The core types are:
//! - [`Mapping`]: one or more offset-range correspondences with a
//!   [`CapabilitySet`] describing which feature classes the spans support
//! - [`SourceMap`]: bidirectional offset and range translation over a set of
//!   mappings, with capability filtering
//! - [`LinkedPositionMap`]: same-document mirror links for spans that must
//!   be edited together
//!
//! All offsets are absolute byte offsets into the respective text buffer.
//! Line/column presentation is a concern of the document layer, not of this
//! crate.
//!
//! # Example
//!
//! ```rust
//! use weft_source_map::{CapabilitySet, Mapping, SourceMap};
//!
//! // Source "<a>{{x}}</a>": the `x` at offset 5 appears at offset 10 of the
//! // generated script.
//! let map = SourceMap::new(vec![Mapping::one(5, 10, 1, CapabilitySet::all())]);
//!
//! assert_eq!(map.to_source_offset(10, |_| true), Some(5));
//! assert_eq!(map.to_generated_offset(5, |_| true), Some(10));
//! ```

pub mod capabilities;
pub mod error;
pub mod linked;
pub mod mapping;
pub mod source_map;

pub use capabilities::CapabilitySet;
pub use error::{MappingError, Result};
pub use linked::LinkedPositionMap;
pub use mapping::Mapping;
pub use source_map::{MappedOffset, SourceMap};
