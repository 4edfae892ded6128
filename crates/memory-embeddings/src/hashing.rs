//! Hashing vectorizer.
//!
//! Each token is hashed with SHA-1; the first 8 digest bytes (big-endian)
//! pick a bucket and a sign, and the token length sets the magnitude:
//!
//! ```text
//! value     = u64::from_be_bytes(sha1(token)[..8])
//! bucket    = value % dimension
//! magnitude = 1 + len(token) / 10
//! sign      = -1 if bit 31 of value is set, else +1
//! ```
//!
//! Contributions that land in the same bucket add up. The accumulated vector
//! is L2-normalized unless every token cancelled out (or there were none).

use sha1::{Digest, Sha1};
use tracing::trace;

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Default embedding width
pub const DEFAULT_DIMENSION: usize = 384;

const SIGN_BIT: u32 = 31;

/// Split text into lower-cased runs of ASCII letters, digits and apostrophes.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '\''))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn token_hash(token: &str) -> u64 {
    let digest = Sha1::digest(token.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

/// Embed `text` into a `dimension`-wide unit vector.
///
/// Text without any token yields the all-zero vector.
pub fn embed(text: &str, dimension: usize) -> Result<Embedding, EmbeddingError> {
    if dimension == 0 {
        return Err(EmbeddingError::InvalidDimension(dimension));
    }

    let mut values = vec![0.0f32; dimension];
    let tokens = tokenize(text);
    for token in &tokens {
        let value = token_hash(token);
        let bucket = (value % dimension as u64) as usize;
        let magnitude = 1.0 + token.len() as f32 / 10.0;
        let sign = if (value >> SIGN_BIT) & 1 == 1 { -1.0 } else { 1.0 };
        values[bucket] += magnitude * sign;
    }

    trace!(tokens = tokens.len(), dimension, "Embedded text");
    Ok(Embedding::new(values))
}

/// [`EmbeddingModel`] wrapper around [`embed`] for a fixed width.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    info: ModelInfo,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidDimension(dimension));
        }
        Ok(Self {
            info: ModelInfo {
                name: "sha1-hashing".to_string(),
                dimension,
            },
        })
    }

    pub fn dimension(&self) -> usize {
        self.info.dimension
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            info: ModelInfo {
                name: "sha1-hashing".to_string(),
                dimension: DEFAULT_DIMENSION,
            },
        }
    }
}

impl EmbeddingModel for HashingEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        embed(text, self.info.dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn norm(emb: &Embedding) -> f32 {
        emb.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Don't STOP-me now, 42 times!"),
            vec!["don't", "stop", "me", "now", "42", "times"]
        );
        assert!(tokenize("  -- !! ").is_empty());
    }

    #[test]
    fn test_token_hash_prefix() {
        // sha1("hello") = aaf4c61ddcc5e8a2...
        assert_eq!(token_hash("hello"), 0xaaf4_c61d_dcc5_e8a2);
    }

    #[test]
    fn test_single_token_bucket_and_sign() {
        // low bits 0xa2 -> bucket 2 of 8, bit 31 of 0xdcc5e8a2 is set -> negative
        let emb = embed("hello", 8).unwrap();
        for (i, v) in emb.values.iter().enumerate() {
            if i == 2 {
                assert!((v + 1.0).abs() < 1e-6);
            } else {
                assert_eq!(*v, 0.0);
            }
        }
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let emb = embed("", 16).unwrap();
        assert_eq!(emb.dimension(), 16);
        assert!(emb.is_zero());

        let emb = embed("?!  ...", 16).unwrap();
        assert!(emb.is_zero());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            embed("hello", 0),
            Err(EmbeddingError::InvalidDimension(0))
        ));
        assert!(HashingEmbedder::new(0).is_err());
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            embed("Hello World", 32).unwrap(),
            embed("hello world", 32).unwrap()
        );
    }

    #[test]
    fn test_identical_text_self_similarity() {
        let a = embed("the quick brown fox", 64).unwrap();
        let b = embed("the quick brown fox", 64).unwrap();
        assert!((a.cosine_similarity(&b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_embedder_trait() {
        let embedder = HashingEmbedder::new(48).unwrap();
        assert_eq!(embedder.info().dimension, 48);
        assert_eq!(embedder.info().name, "sha1-hashing");
        let batch = embedder.embed_batch(&["alpha", "beta"]).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], embed("alpha", 48).unwrap());
        assert_eq!(HashingEmbedder::default().dimension(), DEFAULT_DIMENSION);
    }

    proptest! {
        #[test]
        fn prop_deterministic_unit_vectors(text in "[a-zA-Z0-9' ]{0,64}", dim in 1usize..512) {
            let a = embed(&text, dim).unwrap();
            let b = embed(&text, dim).unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.dimension(), dim);
            if !a.is_zero() {
                prop_assert!((norm(&a) - 1.0).abs() < 1e-4);
            }
        }
    }
}
