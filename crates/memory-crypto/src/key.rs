//! Encryption key resolution.
//!
//! A key is configured as a single string. Resolution order:
//! 1. hex
//! 2. standard base64
//! 3. the raw UTF-8 bytes of the string
//!
//! The first form that yields 16, 24 or 32 bytes wins.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretSlice};

use crate::error::CryptoError;

/// Accepted key sizes in bytes (AES-128, AES-192, AES-256).
pub const VALID_KEY_LENGTHS: [usize; 3] = [16, 24, 32];

/// Resolved AES key material.
///
/// The bytes are zeroized on drop and redacted from `Debug` output.
#[derive(Debug)]
pub struct EncryptionKey(SecretSlice<u8>);

impl EncryptionKey {
    /// Wrap raw key bytes, checking the length.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if !VALID_KEY_LENGTHS.contains(&bytes.len()) {
            return Err(CryptoError::InvalidKey(format!(
                "key must be 16, 24 or 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(SecretSlice::from(bytes)))
    }

    /// Resolve a configured key string.
    pub fn resolve(value: &str) -> Result<Self, CryptoError> {
        let candidate = value.trim();
        if candidate.is_empty() {
            return Err(CryptoError::InvalidKey(
                "an encryption key is required".to_string(),
            ));
        }

        if let Ok(bytes) = hex::decode(candidate) {
            if VALID_KEY_LENGTHS.contains(&bytes.len()) {
                return Self::from_bytes(bytes);
            }
        }

        if let Ok(bytes) = STANDARD.decode(candidate) {
            if VALID_KEY_LENGTHS.contains(&bytes.len()) {
                return Self::from_bytes(bytes);
            }
        }

        if VALID_KEY_LENGTHS.contains(&candidate.len()) {
            return Self::from_bytes(candidate.as_bytes().to_vec());
        }

        Err(CryptoError::InvalidKey(
            "key must be provided as hex, base64, or raw bytes (16/24/32 length)".to_string(),
        ))
    }

    pub(crate) fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        self.0.expose_secret()
    }
}
