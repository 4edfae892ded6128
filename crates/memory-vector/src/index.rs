//! Vector index trait and types.
//!
//! Defines the interface for vector similarity search.

use memory_embeddings::Embedding;
use serde::{Deserialize, Serialize};

use crate::error::VectorError;

/// Result of a vector search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Vector ID assigned when the vector was added
    pub vector_id: i64,
    /// Inner product with the query (cosine similarity for unit vectors, higher = closer)
    pub score: f32,
}

impl SearchResult {
    pub fn new(vector_id: i64, score: f32) -> Self {
        Self { vector_id, score }
    }
}

/// Index statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of vectors in the index
    pub vector_count: usize,
    /// Embedding dimension
    pub dimension: usize,
    /// Highest vector ID currently stored
    pub max_id: Option<i64>,
}

/// Trait for vector indexes.
///
/// IDs are supplied by the caller; the index never invents or reuses them.
pub trait VectorIndex: Send + Sync {
    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the number of vectors in the index
    fn len(&self) -> usize;

    /// Check if the index is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a vector with the given ID.
    /// Returns error if the ID already exists or the width is wrong.
    fn add(&mut self, id: i64, embedding: &Embedding) -> Result<(), VectorError>;

    /// Search for k nearest neighbors.
    /// Returns results sorted by similarity (best first).
    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>, VectorError>;

    /// Remove vectors by ID.
    /// Returns how many of the given IDs were present; absent IDs are ignored.
    fn remove(&mut self, ids: &[i64]) -> usize;

    /// Check if a vector ID exists
    fn contains(&self, id: i64) -> bool;

    /// Get index statistics
    fn stats(&self) -> IndexStats;

    /// Encode every `(id, vector)` pair into an opaque byte payload.
    fn serialize(&self) -> Vec<u8>;

    /// Clear all vectors from the index
    fn clear(&mut self);
}
