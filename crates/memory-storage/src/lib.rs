//! Storage layer for the encrypted memory store.
//!
//! Provides:
//! - Metadata ledger (dimension + monotonic vector ID counter)
//! - Exclusive advisory lock per store path
//! - Atomic, fsynced file replacement
//! - Encrypted load/mutate/save sessions over the (index, metadata) pair

pub mod error;
pub mod files;
pub mod lock;
pub mod metadata;
pub mod store;

pub use error::StorageError;
pub use lock::StoreLock;
pub use metadata::StoreMetadata;
pub use store::{StoreConfig, StoreExport, StoreSession, StoreStats, VectorStore, LOCK_SUFFIX};
