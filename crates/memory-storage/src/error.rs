//! Storage layer error types.

use std::path::PathBuf;

use memory_crypto::CryptoError;
use memory_embeddings::EmbeddingError;
use memory_vector::VectorError;
use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Store configuration does not match what is on disk, or is unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request rejected before touching the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// Envelope failure (wrong key, tampering, bad key material)
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Index operation or decoding failed
    #[error(transparent)]
    Vector(#[from] VectorError),

    /// Embedding failed
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Store lock could not be taken
    #[error("Failed to lock {path:?}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl StorageError {
    /// True for failures a retry cannot fix without changing configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StorageError::Configuration(_)
                | StorageError::Crypto(CryptoError::InvalidKey(_))
                | StorageError::Embedding(EmbeddingError::InvalidDimension(_))
        )
    }
}
