//! # memory-embeddings
//!
//! Deterministic text embedding for the encrypted memory store.
//!
//! This crate turns text into fixed-length unit vectors used both for stored
//! memories and for search queries.
//!
//! ## Features
//! - Pure hashing vectorizer, no model download or network access
//! - Byte-for-byte identical output for identical `(text, dimension)`
//! - L2-normalized vectors so inner product equals cosine similarity

pub mod error;
pub mod hashing;
pub mod model;

pub use error::EmbeddingError;
pub use hashing::{embed, tokenize, HashingEmbedder, DEFAULT_DIMENSION};
pub use model::{Embedding, EmbeddingModel, ModelInfo};
