//! Error types for weft-source-map

use thiserror::Error;

/// Consistency violations in mapping data.
///
/// These are precondition failures: a mapping is validated when it is
/// accepted into a virtual-code tree, not at lookup time, so corrupt data
/// fails near its source (the generator that produced it).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error(
        "mapping arrays disagree in length: {source_offsets} source offsets, \
         {generated_offsets} generated offsets, {lengths} lengths"
    )]
    SegmentArityMismatch {
        source_offsets: usize,
        generated_offsets: usize,
        lengths: usize,
    },

    #[error("generated_lengths has {generated_lengths} entries for {segments} segments")]
    GeneratedLengthsMismatch {
        generated_lengths: usize,
        segments: usize,
    },
}

pub type Result<T> = std::result::Result<T, MappingError>;
