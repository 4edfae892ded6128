//! Encrypted vector store.
//!
//! `VectorStore` owns the paths, the configured dimension and the envelope.
//! Every operation opens a [`StoreSession`], which holds the store lock for
//! its whole lifetime, decrypts the index and metadata lazily on first
//! access, and writes back only what changed when committed. Dropping a
//! session without committing releases the lock and leaves the files as
//! they were.

use std::path::{Path, PathBuf};

use memory_crypto::{EncryptionKey, Envelope};
use memory_embeddings::Embedding;
use memory_vector::{FlatIndex, SearchResult, VectorIndex};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::files::{self, StagedFile};
use crate::lock::StoreLock;
use crate::metadata::StoreMetadata;

/// Suffix appended to the index path to name the lock file
pub const LOCK_SUFFIX: &str = ".lock";

/// Where a store lives and what width it holds.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Encrypted index file
    pub index_path: PathBuf,
    /// Encrypted metadata file
    pub meta_path: PathBuf,
    /// Configured embedding dimension
    pub dimension: u32,
}

impl StoreConfig {
    pub fn new(index_path: impl Into<PathBuf>, meta_path: impl Into<PathBuf>, dimension: u32) -> Self {
        Self {
            index_path: index_path.into(),
            meta_path: meta_path.into(),
            dimension,
        }
    }

    /// Lock file path: the index path plus [`LOCK_SUFFIX`].
    pub fn lock_path(&self) -> PathBuf {
        let mut path = self.index_path.clone().into_os_string();
        path.push(LOCK_SUFFIX);
        PathBuf::from(path)
    }
}

/// Decrypted contents of a store, for re-encryption under another key.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreExport {
    /// Serialized index payload (plaintext)
    pub index: Vec<u8>,
    pub meta: StoreMetadata,
}

/// Snapshot of store counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub dimension: u32,
    pub next_vector_id: i64,
    pub vector_count: usize,
}

/// Encrypted, lock-guarded vector store at one pair of paths.
pub struct VectorStore {
    config: StoreConfig,
    envelope: Envelope,
}

impl VectorStore {
    pub fn new(config: StoreConfig, key: &EncryptionKey) -> Result<Self, StorageError> {
        if config.dimension == 0 {
            return Err(StorageError::Configuration(
                "dimension must be > 0".to_string(),
            ));
        }
        let envelope = Envelope::new(key)?;
        Ok(Self { config, envelope })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Take the store lock and start a session.
    pub fn session(&self) -> Result<StoreSession<'_>, StorageError> {
        let lock = StoreLock::acquire(&self.config.lock_path())?;
        Ok(StoreSession {
            store: self,
            _lock: lock,
            index: None,
            meta: None,
            index_dirty: false,
            meta_dirty: false,
        })
    }

    /// Store an embedding under a freshly allocated ID.
    pub fn add(&self, embedding: &Embedding) -> Result<i64, StorageError> {
        let mut session = self.session()?;
        let id = session.metadata_mut()?.allocate_id()?;
        session.index_mut()?.add(id, embedding)?;
        session.commit()?;

        info!(vector_id = id, "Added vector to store");
        Ok(id)
    }

    /// Remove vectors by ID, returning how many were present.
    ///
    /// An empty ID list returns 0 without locking or touching the files.
    pub fn remove(&self, ids: &[i64]) -> Result<usize, StorageError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut session = self.session()?;
        let removed = session.index_mut()?.remove(ids);
        session.commit()?;

        info!(requested = ids.len(), removed = removed, "Removed vectors from store");
        Ok(removed)
    }

    /// Rank stored vectors against `query`. Never writes.
    pub fn search(&self, query: &Embedding, top_k: usize) -> Result<Vec<SearchResult>, StorageError> {
        let mut session = self.session()?;
        let index = session.index()?;
        if index.is_empty() {
            return Ok(Vec::new());
        }
        Ok(index.search(query, top_k)?)
    }

    /// Decrypt the index and metadata for offline re-encryption. Never writes.
    pub fn export_plaintext(&self) -> Result<StoreExport, StorageError> {
        let mut session = self.session()?;
        let meta = *session.metadata()?;
        let index = session.index()?.serialize();
        debug!(bytes = index.len(), "Exported plaintext store");
        Ok(StoreExport { index, meta })
    }

    /// Replace the whole store with a plaintext export, encrypted under this
    /// store's key. Existing files are overwritten without being read.
    pub fn import_plaintext(&self, export: &StoreExport) -> Result<(), StorageError> {
        if export.meta.dimension != self.config.dimension {
            return Err(StorageError::Configuration(format!(
                "restored metadata dimension {} does not match configured dimension {}",
                export.meta.dimension, self.config.dimension
            )));
        }
        let index = FlatIndex::deserialize(&export.index)?;
        check_index_dimension(&index, self.config.dimension)?;
        export.meta.check_covers(index.stats().max_id)?;

        let mut session = self.session()?;
        session.replace(index, export.meta);
        session.commit()?;

        info!(
            next_vector_id = export.meta.next_vector_id,
            "Restored store from plaintext export"
        );
        Ok(())
    }

    /// Counters for operational inspection. Never writes.
    pub fn stats(&self) -> Result<StoreStats, StorageError> {
        let mut session = self.session()?;
        let meta = *session.metadata()?;
        let vector_count = session.index()?.len();
        Ok(StoreStats {
            dimension: meta.dimension,
            next_vector_id: meta.next_vector_id,
            vector_count,
        })
    }

    fn load_index(&self) -> Result<FlatIndex, StorageError> {
        let path = &self.config.index_path;
        let Some(blob) = files::read_if_exists(path)? else {
            debug!(path = ?path, dim = self.config.dimension, "Bootstrapping empty index");
            return Ok(FlatIndex::new(self.config.dimension as usize));
        };
        let plaintext = self.envelope.decrypt(&blob)?;
        let index = FlatIndex::deserialize(&plaintext)?;
        check_index_dimension(&index, self.config.dimension)?;
        debug!(path = ?path, vectors = index.len(), "Loaded index");
        Ok(index)
    }

    fn load_metadata(&self) -> Result<StoreMetadata, StorageError> {
        let path = &self.config.meta_path;
        let Some(blob) = files::read_if_exists(path)? else {
            return Ok(StoreMetadata::bootstrap(self.config.dimension));
        };
        let plaintext = self.envelope.decrypt(&blob)?;
        let meta = StoreMetadata::from_bytes(&plaintext)?;
        meta.check_dimension(self.config.dimension)?;
        Ok(meta)
    }

    fn stage_encrypted(&self, path: &Path, plaintext: &[u8]) -> Result<StagedFile, StorageError> {
        let blob = self.envelope.encrypt(plaintext)?;
        files::stage(path, &blob)
    }
}

fn check_index_dimension(index: &FlatIndex, configured: u32) -> Result<(), StorageError> {
    if index.dimension() != configured as usize {
        return Err(StorageError::Configuration(format!(
            "stored index dimension {} does not match configured dimension {}",
            index.dimension(),
            configured
        )));
    }
    Ok(())
}

/// Locked, lazily loaded view of one store for the length of a command.
pub struct StoreSession<'a> {
    store: &'a VectorStore,
    _lock: StoreLock,
    index: Option<FlatIndex>,
    meta: Option<StoreMetadata>,
    index_dirty: bool,
    meta_dirty: bool,
}

impl StoreSession<'_> {
    fn loaded_index(&mut self) -> Result<&mut FlatIndex, StorageError> {
        let index = match self.index.take() {
            Some(index) => index,
            None => self.store.load_index()?,
        };
        Ok(self.index.insert(index))
    }

    fn loaded_metadata(&mut self) -> Result<&mut StoreMetadata, StorageError> {
        let meta = match self.meta.take() {
            Some(meta) => meta,
            None => self.store.load_metadata()?,
        };
        Ok(self.meta.insert(meta))
    }

    /// Read access to the index.
    pub fn index(&mut self) -> Result<&FlatIndex, StorageError> {
        self.loaded_index().map(|index| &*index)
    }

    /// Write access to the index; marks it for saving.
    pub fn index_mut(&mut self) -> Result<&mut FlatIndex, StorageError> {
        self.index_dirty = true;
        self.loaded_index()
    }

    /// Read access to the metadata.
    pub fn metadata(&mut self) -> Result<&StoreMetadata, StorageError> {
        self.loaded_metadata().map(|meta| &*meta)
    }

    /// Write access to the metadata; marks it for saving.
    pub fn metadata_mut(&mut self) -> Result<&mut StoreMetadata, StorageError> {
        self.meta_dirty = true;
        self.loaded_metadata()
    }

    /// Swap in a new index and metadata wholesale.
    pub fn replace(&mut self, index: FlatIndex, meta: StoreMetadata) {
        self.index = Some(index);
        self.meta = Some(meta);
        self.index_dirty = true;
        self.meta_dirty = true;
    }

    /// Whether committing would write anything.
    pub fn is_dirty(&self) -> bool {
        self.index_dirty || self.meta_dirty
    }

    /// Encrypt and durably write whatever changed, then release the lock.
    ///
    /// Both payloads are staged before either replaces its target. Metadata
    /// is replaced first: a crash in between can skip an ID but never
    /// re-issue one.
    pub fn commit(self) -> Result<bool, StorageError> {
        if !self.is_dirty() {
            return Ok(false);
        }

        let store = self.store;
        let staged_meta = match (&self.meta, self.meta_dirty) {
            (Some(meta), true) => Some(store.stage_encrypted(&store.config.meta_path, &meta.to_bytes()?)?),
            _ => None,
        };
        let staged_index = match (&self.index, self.index_dirty) {
            (Some(index), true) => Some(store.stage_encrypted(&store.config.index_path, &index.serialize())?),
            _ => None,
        };

        if let Some(staged) = staged_meta {
            staged.commit()?;
        }
        if let Some(staged) = staged_index {
            staged.commit()?;
        }

        debug!(
            index = self.index_dirty,
            meta = self.meta_dirty,
            "Committed store session"
        );
        Ok(true)
    }
}
