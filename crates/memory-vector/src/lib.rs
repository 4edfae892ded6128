//! # memory-vector
//!
//! Vector index for the encrypted memory store.
//!
//! This crate provides similarity search over explicitly ID-addressed unit
//! vectors. The shipped implementation is an exact flat index: every query
//! is scored against every stored vector, so recall is always 100%.
//!
//! ## Features
//! - `VectorIndex` trait so the search structure stays pluggable
//! - Inner-product (cosine on unit vectors) scoring
//! - Deterministic ranking: descending score, ties broken by ascending ID
//! - Compact little-endian binary codec for persistence

pub mod error;
pub mod flat;
pub mod format;
pub mod index;

pub use error::VectorError;
pub use flat::FlatIndex;
pub use index::{IndexStats, SearchResult, VectorIndex};
