//! # memory-crypto
//!
//! At-rest encryption for the memory store files.
//!
//! Every payload is sealed with AES-GCM under a fresh random 96-bit nonce.
//! The stored blob is the nonce followed by the ciphertext and tag:
//!
//! ```text
//! [ nonce (12 bytes) | ciphertext | tag (16 bytes) ]
//! ```
//!
//! Opening a blob either returns the exact original plaintext or fails with
//! [`CryptoError::DecryptionFailed`]; no partial plaintext is ever returned.

pub mod envelope;
pub mod error;
pub mod key;

pub use envelope::{decrypt, encrypt, Envelope, MIN_BLOB_LEN, NONCE_LEN};
pub use error::CryptoError;
pub use key::{EncryptionKey, VALID_KEY_LENGTHS};
