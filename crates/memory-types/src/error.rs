//! Error types for configuration handling.

use thiserror::Error;

/// Unified error type for configuration.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
