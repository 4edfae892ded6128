//! Vector index error types.

use thiserror::Error;

/// Errors that can occur during vector operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// ID already present in the index
    #[error("Duplicate vector id: {0}")]
    DuplicateId(i64),

    /// Vector contains NaN or infinite components
    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    /// Serialized index could not be decoded
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),
}
