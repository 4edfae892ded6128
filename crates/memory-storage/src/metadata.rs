//! Metadata ledger.
//!
//! The ledger is the only source of vector IDs. `next_vector_id` starts at 1,
//! only ever grows, and is persisted alongside the index so IDs survive
//! process restarts and are never handed out twice.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Persisted store metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Embedding width the store was built with
    pub dimension: u32,
    /// ID the next added vector receives
    pub next_vector_id: i64,
}

impl StoreMetadata {
    /// Metadata for a store that has never been written.
    pub fn bootstrap(dimension: u32) -> Self {
        Self {
            dimension,
            next_vector_id: 1,
        }
    }

    /// Hand out the next ID and advance the counter.
    pub fn allocate_id(&mut self) -> Result<i64, StorageError> {
        let id = self.next_vector_id;
        self.next_vector_id = id
            .checked_add(1)
            .ok_or_else(|| StorageError::Validation("vector id space exhausted".to_string()))?;
        Ok(id)
    }

    /// Reject metadata written for a different embedding width.
    pub fn check_dimension(&self, configured: u32) -> Result<(), StorageError> {
        if self.dimension != configured {
            return Err(StorageError::Configuration(format!(
                "stored index dimension {} does not match configured dimension {}",
                self.dimension, configured
            )));
        }
        Ok(())
    }

    /// Check the counter is ahead of every ID in an index.
    pub fn check_covers(&self, max_id: Option<i64>) -> Result<(), StorageError> {
        if self.next_vector_id < 1 {
            return Err(StorageError::Validation(format!(
                "next_vector_id must be positive, got {}",
                self.next_vector_id
            )));
        }
        if let Some(max_id) = max_id {
            if self.next_vector_id <= max_id {
                return Err(StorageError::Validation(format!(
                    "next_vector_id {} does not exceed stored id {}",
                    self.next_vector_id, max_id
                )));
            }
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
