//! Command dispatcher.
//!
//! Maps each worker command onto the store: embed, then add, remove or
//! search; export or import plaintext for key rotation. Every call is one
//! request and one response with no partial results.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use memory_embeddings::{EmbeddingModel, HashingEmbedder};
use memory_storage::{StorageError, StoreExport, VectorStore};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::cli::Commands;
use crate::protocol::{
    parse_request, AddRequest, AddResponse, PlaintextExport, RemoveRequest, RemoveResponse,
    RestoreRequest, RestoreResponse, RotateResponse, SearchRequest, SearchResponse, StatsResponse,
};

/// Runs requests against one store.
pub struct Dispatcher {
    store: VectorStore,
    embedder: HashingEmbedder,
}

impl Dispatcher {
    /// Pair a store with an embedder of the store's dimension.
    pub fn new(store: VectorStore) -> Result<Self, StorageError> {
        let embedder = HashingEmbedder::new(store.config().dimension as usize)?;
        let info = embedder.info();
        debug!(model = %info.name, dimension = info.dimension, "Embedder ready");
        Ok(Self { store, embedder })
    }

    pub fn add(&self, request: &AddRequest) -> Result<AddResponse, StorageError> {
        if request.text.trim().is_empty() {
            return Err(StorageError::Validation(
                "text must not be empty".to_string(),
            ));
        }
        let embedding = self.embedder.embed(&request.text)?;
        let vector_id = self.store.add(&embedding)?;
        Ok(AddResponse { vector_id })
    }

    pub fn remove(&self, request: &RemoveRequest) -> Result<RemoveResponse, StorageError> {
        let removed = self.store.remove(&request.vector_ids)?;
        Ok(RemoveResponse { removed })
    }

    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse, StorageError> {
        let query = self.embedder.embed(&request.query)?;
        let results = self.store.search(&query, request.limit())?;
        debug!(top_k = request.limit(), found = results.len(), "Search served");
        Ok(SearchResponse { results })
    }

    /// Decrypted export for re-encryption under a new key.
    pub fn rotate(&self) -> Result<RotateResponse, StorageError> {
        let export = self.store.export_plaintext()?;
        Ok(PlaintextExport {
            index: STANDARD.encode(&export.index),
            meta: export.meta,
        })
    }

    /// Replace the store wholesale with a plaintext export.
    pub fn restore(&self, request: &RestoreRequest) -> Result<RestoreResponse, StorageError> {
        let index = STANDARD
            .decode(request.index.trim())
            .map_err(|e| StorageError::Validation(format!("index is not valid base64: {}", e)))?;
        self.store.import_plaintext(&StoreExport {
            index,
            meta: request.meta,
        })?;
        Ok(RestoreResponse::ok())
    }

    pub fn stats(&self) -> Result<StatsResponse, StorageError> {
        Ok(self.store.stats()?.into())
    }

    /// Run `command` with a raw JSON body and return the JSON response.
    ///
    /// `body` is ignored by commands that take no request.
    pub fn handle(&self, command: Commands, body: &str) -> Result<Value, StorageError> {
        info!(command = command.name(), "Dispatching command");
        match command {
            Commands::Add => to_value(self.add(&parse_request(body)?)?),
            Commands::Remove => to_value(self.remove(&parse_request(body)?)?),
            Commands::Search => to_value(self.search(&parse_request(body)?)?),
            Commands::Rotate => to_value(self.rotate()?),
            Commands::Restore => to_value(self.restore(&parse_request(body)?)?),
            Commands::Stats => to_value(self.stats()?),
        }
    }
}

fn to_value<T: Serialize>(response: T) -> Result<Value, StorageError> {
    Ok(serde_json::to_value(response)?)
}
