//! Error types for collection operations.

use thiserror::Error;

/// Errors raised by positional operations on tracked collections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// Index past the end of the collection.
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange {
        index: usize,
        len: usize,
    },
}
