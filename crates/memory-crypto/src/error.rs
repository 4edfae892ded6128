//! Envelope error types.

use thiserror::Error;

/// Errors that can occur while sealing or opening payloads.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key material missing or not a usable AES key
    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    /// Blob too short, tampered with, or sealed under another key
    #[error("Decryption failed: payload is corrupt or the key is wrong")]
    DecryptionFailed,

    /// AEAD seal failed
    #[error("Encryption failed")]
    EncryptionFailed,
}
