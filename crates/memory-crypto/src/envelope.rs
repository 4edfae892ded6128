//! AES-GCM envelope.

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce};
use rand::RngCore;
use tracing::debug;

use crate::error::CryptoError;
use crate::key::EncryptionKey;

/// Nonce length prefixed to every blob
pub const NONCE_LEN: usize = 12;

/// Smallest blob accepted by [`Envelope::decrypt`]
pub const MIN_BLOB_LEN: usize = NONCE_LEN + 1;

type Aes192Gcm = AesGcm<Aes192, U12>;

enum Cipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

/// Seals and opens payloads under one key.
pub struct Envelope {
    cipher: Cipher,
}

impl Envelope {
    pub fn new(key: &EncryptionKey) -> Result<Self, CryptoError> {
        let bytes = key.bytes();
        let cipher = match bytes.len() {
            16 => Aes128Gcm::new_from_slice(bytes).map(Cipher::Aes128),
            24 => Aes192Gcm::new_from_slice(bytes).map(Cipher::Aes192),
            32 => Aes256Gcm::new_from_slice(bytes).map(Cipher::Aes256),
            n => {
                return Err(CryptoError::InvalidKey(format!(
                    "unsupported key length {}",
                    n
                )))
            }
        }
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// Seal `plaintext` under a fresh random nonce.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = match &self.cipher {
            Cipher::Aes128(c) => c.encrypt(nonce, plaintext),
            Cipher::Aes192(c) => c.encrypt(nonce, plaintext),
            Cipher::Aes256(c) => c.encrypt(nonce, plaintext),
        }
        .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        debug!(plaintext = plaintext.len(), sealed = blob.len(), "Sealed payload");
        Ok(blob)
    }

    /// Open a blob produced by [`Envelope::encrypt`].
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if blob.len() < MIN_BLOB_LEN {
            return Err(CryptoError::DecryptionFailed);
        }
        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        match &self.cipher {
            Cipher::Aes128(c) => c.decrypt(nonce, ciphertext),
            Cipher::Aes192(c) => c.decrypt(nonce, ciphertext),
            Cipher::Aes256(c) => c.decrypt(nonce, ciphertext),
        }
        .map_err(|_| CryptoError::DecryptionFailed)
    }
}

/// Seal `plaintext` under `key`.
pub fn encrypt(plaintext: &[u8], key: &EncryptionKey) -> Result<Vec<u8>, CryptoError> {
    Envelope::new(key)?.encrypt(plaintext)
}

/// Open `blob` with `key`.
pub fn decrypt(blob: &[u8], key: &EncryptionKey) -> Result<Vec<u8>, CryptoError> {
    Envelope::new(key)?.decrypt(blob)
}
