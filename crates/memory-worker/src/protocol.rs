//! JSON request and response bodies.
//!
//! One request object is read from stdin per invocation and one response
//! object is written to stdout.

use memory_storage::{StorageError, StoreMetadata, StoreStats};
use memory_vector::SearchResult;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// `top_k` used when a search request leaves it out
pub const DEFAULT_TOP_K: i64 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct AddRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddResponse {
    pub vector_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoveRequest {
    #[serde(default)]
    pub vector_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveResponse {
    pub removed: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Non-positive values are clamped to 1
    #[serde(default = "default_top_k")]
    pub top_k: i64,
}

fn default_top_k() -> i64 {
    DEFAULT_TOP_K
}

impl SearchRequest {
    /// Result count to ask the index for.
    pub fn limit(&self) -> usize {
        usize::try_from(self.top_k.max(1)).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// Plaintext export produced by `rotate` and consumed by `restore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaintextExport {
    /// Standard base64 of the serialized index
    pub index: String,
    pub meta: StoreMetadata,
}

pub type RotateResponse = PlaintextExport;
pub type RestoreRequest = PlaintextExport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreResponse {
    pub status: String,
}

impl RestoreResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub dimension: u32,
    pub next_vector_id: i64,
    pub vector_count: usize,
}

impl From<StoreStats> for StatsResponse {
    fn from(stats: StoreStats) -> Self {
        Self {
            dimension: stats.dimension,
            next_vector_id: stats.next_vector_id,
            vector_count: stats.vector_count,
        }
    }
}

/// Parse a request body, reporting any problem as a validation failure.
pub fn parse_request<T: DeserializeOwned>(body: &str) -> Result<T, StorageError> {
    if body.trim().is_empty() {
        return Err(StorageError::Validation(
            "request body is empty".to_string(),
        ));
    }
    serde_json::from_str(body)
        .map_err(|e| StorageError::Validation(format!("malformed request: {}", e)))
}
