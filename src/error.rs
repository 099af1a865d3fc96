//! Error taxonomy for the sparse containers: one flat `thiserror`-derived enum, one
//! `Result` alias, synchronous and fully recoverable — no panics on caller-supplied
//! input anywhere in this crate.

use thiserror::Error;

pub type SparseResult<T> = Result<T, SparseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SparseError {
    #[error("Invalid index: {0} is not a non-negative integer")]
    InvalidIndex(String),

    #[error("Invalid count: {0} is not a non-negative integer")]
    InvalidCount(String),

    #[error("Slicer rewind: end_index {end} precedes the previous end_index {prev}")]
    SlicerRewind { prev: usize, end: usize },

    #[error("Invalid serialized element at position {index}: {reason}")]
    InvalidSerialized { index: usize, reason: String },

    #[error("Invalid embed value at position {index}: expected a string or a non-null, non-numeric value, got {found}")]
    InvalidEmbed { index: usize, found: String },
}
