//! # memory-types
//!
//! Shared configuration types for the encrypted memory store.
//!
//! - Settings: layered worker configuration (paths, dimension, key, logging)
//! - MemoryError: configuration failures

pub mod config;
pub mod error;

pub use config::{Settings, DEFAULT_EMBED_DIMENSION, ENV_PREFIX};
pub use error::MemoryError;
