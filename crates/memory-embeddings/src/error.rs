//! Embedding error types.

use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Embedding width cannot hold any token
    #[error("Invalid embedding dimension: {0}")]
    InvalidDimension(usize),
}
