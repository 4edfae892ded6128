//! Exact flat inner-product index.
//!
//! Vectors live in a `BTreeMap` keyed by ID so iteration, serialization and
//! tie-breaking all follow ascending ID order. Search is a full scan.

use std::collections::BTreeMap;

use memory_embeddings::Embedding;
use tracing::debug;

use crate::error::VectorError;
use crate::format;
use crate::index::{IndexStats, SearchResult, VectorIndex};

/// Brute-force index over ID-addressed unit vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    vectors: BTreeMap<i64, Vec<f32>>,
}

impl FlatIndex {
    /// Create an empty index for vectors of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: BTreeMap::new(),
        }
    }

    /// Rebuild an index from a payload produced by [`VectorIndex::serialize`].
    pub fn deserialize(bytes: &[u8]) -> Result<Self, VectorError> {
        let (header, records) = format::decode(bytes)?;
        let mut index = Self::new(header.dimensions as usize);
        for (id, values) in records {
            if index.vectors.insert(id, values).is_some() {
                return Err(VectorError::CorruptIndex(format!(
                    "duplicate vector id {}",
                    id
                )));
            }
        }
        debug!(
            vectors = index.len(),
            dim = index.dimension,
            "Deserialized flat index"
        );
        Ok(index)
    }

    /// IDs currently stored, ascending.
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.vectors.keys().copied()
    }

    fn check_dimension(&self, actual: usize) -> Result<(), VectorError> {
        if actual != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual,
            });
        }
        Ok(())
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    // + 0.0 folds -0.0 into 0.0 so equal scores fall through to the ID tie-break
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum::<f32>() + 0.0
}

impl VectorIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn add(&mut self, id: i64, embedding: &Embedding) -> Result<(), VectorError> {
        self.check_dimension(embedding.dimension())?;
        if embedding.values.iter().any(|v| !v.is_finite()) {
            return Err(VectorError::InvalidVector(format!(
                "vector {} has non-finite components",
                id
            )));
        }
        if self.vectors.contains_key(&id) {
            return Err(VectorError::DuplicateId(id));
        }

        self.vectors.insert(id, embedding.values.clone());
        debug!(id = id, "Added vector");
        Ok(())
    }

    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>, VectorError> {
        self.check_dimension(query.dimension())?;
        if k == 0 || self.vectors.is_empty() {
            return Ok(Vec::new());
        }

        let mut results: Vec<SearchResult> = self
            .vectors
            .iter()
            .map(|(&id, values)| SearchResult::new(id, dot(&query.values, values)))
            .collect();
        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.vector_id.cmp(&b.vector_id))
        });
        results.truncate(k);

        debug!(k = k, found = results.len(), "Search complete");
        Ok(results)
    }

    fn remove(&mut self, ids: &[i64]) -> usize {
        let removed = ids
            .iter()
            .filter(|id| self.vectors.remove(*id).is_some())
            .count();
        if removed > 0 {
            debug!(requested = ids.len(), removed = removed, "Removed vectors");
        }
        removed
    }

    fn contains(&self, id: i64) -> bool {
        self.vectors.contains_key(&id)
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            vector_count: self.vectors.len(),
            dimension: self.dimension,
            max_id: self.vectors.keys().next_back().copied(),
        }
    }

    fn serialize(&self) -> Vec<u8> {
        format::encode(
            self.dimension,
            self.vectors.len(),
            self.vectors.iter().map(|(&id, v)| (id, v.as_slice())),
        )
    }

    fn clear(&mut self) {
        self.vectors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::Rng;

    fn random_embedding(dim: usize) -> Embedding {
        let mut rng = rand::rng();
        let values: Vec<f32> = (0..dim).map(|_| rng.random::<f32>() - 0.5).collect();
        Embedding::new(values)
    }

    fn populated(dim: usize, n: i64) -> FlatIndex {
        let mut index = FlatIndex::new(dim);
        for id in 1..=n {
            index.add(id, &random_embedding(dim)).unwrap();
        }
        index
    }

    #[test]
    fn test_create_index() {
        let index = FlatIndex::new(384);
        assert_eq!(index.dimension(), 384);
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_add_and_search() {
        let index = populated(64, 10);
        assert_eq!(index.len(), 10);

        let query = random_embedding(64);
        let results = index.search(&query, 5).unwrap();
        assert_eq!(results.len(), 5);

        // Results should be sorted by score (descending)
        for i in 1..results.len() {
            assert!(results[i - 1].score >= results[i].score);
        }
    }

    #[test]
    fn test_search_exact_match_ranks_first() {
        let mut index = populated(32, 20);
        let target = random_embedding(32);
        index.add(99, &target).unwrap();

        let results = index.search(&target, 3).unwrap();
        assert_eq!(results[0].vector_id, 99);
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_search_empty_index() {
        let index = FlatIndex::new(8);
        let results = index.search(&random_embedding(8), 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_k_larger_than_index() {
        let index = populated(8, 3);
        assert_eq!(index.search(&random_embedding(8), 50).unwrap().len(), 3);
        assert!(index.search(&random_embedding(8), 0).unwrap().is_empty());
    }

    #[test]
    fn test_ties_broken_by_ascending_id() {
        let mut index = FlatIndex::new(2);
        let v = Embedding::new(vec![1.0, 0.0]);
        index.add(7, &v).unwrap();
        index.add(3, &v).unwrap();
        index.add(5, &v).unwrap();

        let ids: Vec<i64> = index
            .search(&v, 3)
            .unwrap()
            .into_iter()
            .map(|r| r.vector_id)
            .collect();
        assert_eq!(ids, vec![3, 5, 7]);
    }

    #[test]
    fn test_zero_scores_tie_on_id() {
        let mut index = FlatIndex::new(2);
        index.add(1, &Embedding::new(vec![-0.6, -0.8])).unwrap();
        index.add(2, &Embedding::new(vec![0.6, 0.8])).unwrap();

        let results = index.search(&Embedding::new(vec![0.0, 0.0]), 2).unwrap();
        let ids: Vec<i64> = results.iter().map(|r| r.vector_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(results.iter().all(|r| r.score.is_sign_positive()));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = FlatIndex::new(64);
        let wrong_dim = random_embedding(32);
        let result = index.add(0, &wrong_dim);
        assert!(matches!(
            result,
            Err(VectorError::DimensionMismatch {
                expected: 64,
                actual: 32
            })
        ));
        assert!(matches!(
            index.search(&wrong_dim, 1),
            Err(VectorError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicate_id() {
        let mut index = FlatIndex::new(16);
        index.add(42, &random_embedding(16)).unwrap();
        let result = index.add(42, &random_embedding(16));
        assert!(matches!(result, Err(VectorError::DuplicateId(42))));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut index = FlatIndex::new(2);
        let bad = Embedding::from_normalized(vec![f32::NAN, 0.0]);
        assert!(matches!(
            index.add(1, &bad),
            Err(VectorError::InvalidVector(_))
        ));
    }

    #[test]
    fn test_remove() {
        let mut index = populated(16, 4);
        assert!(index.contains(2));

        let removed = index.remove(&[2, 4, 100, 2]);
        assert_eq!(removed, 2);
        assert!(!index.contains(2));
        assert!(!index.contains(4));
        assert_eq!(index.len(), 2);
        assert_eq!(index.remove(&[]), 0);
    }

    #[test]
    fn test_stats_and_clear() {
        let mut index = populated(8, 5);
        let stats = index.stats();
        assert_eq!(stats.vector_count, 5);
        assert_eq!(stats.dimension, 8);
        assert_eq!(stats.max_id, Some(5));

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.stats().max_id, None);
    }

    #[test]
    fn test_serialize_round_trip() {
        let index = populated(24, 12);
        let restored = FlatIndex::deserialize(&index.serialize()).unwrap();
        assert_eq!(restored, index);

        let query = random_embedding(24);
        assert_eq!(
            restored.search(&query, 5).unwrap(),
            index.search(&query, 5).unwrap()
        );
    }

    #[test]
    fn test_serialize_empty() {
        let index = FlatIndex::new(384);
        let restored = FlatIndex::deserialize(&index.serialize()).unwrap();
        assert_eq!(restored.dimension(), 384);
        assert!(restored.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let v = [1.0f32, 0.0];
        let bytes = format::encode(2, 2, [(1i64, &v[..]), (1i64, &v[..])]);
        assert!(matches!(
            FlatIndex::deserialize(&bytes),
            Err(VectorError::CorruptIndex(_))
        ));
    }

    #[test]
    fn test_deserialize_garbage() {
        assert!(FlatIndex::deserialize(b"not an index").is_err());
        assert!(FlatIndex::deserialize(&[]).is_err());
    }

    #[test]
    fn test_search_result_wire_shape() {
        let json = serde_json::to_string(&SearchResult::new(3, 0.5)).unwrap();
        assert_eq!(json, r#"{"vector_id":3,"score":0.5}"#);
    }

    proptest! {
        #[test]
        fn prop_remove_counts_intersection(
            present in proptest::collection::btree_set(1i64..50, 0..20),
            requested in proptest::collection::vec(1i64..60, 0..20),
        ) {
            let mut index = FlatIndex::new(4);
            for id in &present {
                index.add(*id, &Embedding::new(vec![1.0, 0.5, 0.25, 0.0])).unwrap();
            }
            let requested_set: std::collections::BTreeSet<i64> = requested.iter().copied().collect();
            let expected = requested_set.intersection(&present).count();

            prop_assert_eq!(index.remove(&requested), expected);
            for id in &requested {
                prop_assert!(!index.contains(*id));
            }
        }

        #[test]
        fn prop_search_sorted_and_bounded(
            vectors in proptest::collection::vec(proptest::collection::vec(-1.0f32..1.0, 6), 0..30),
            query in proptest::collection::vec(-1.0f32..1.0, 6),
            k in 1usize..40,
        ) {
            let mut index = FlatIndex::new(6);
            for (i, v) in vectors.iter().enumerate() {
                index.add(i as i64 + 1, &Embedding::new(v.clone())).unwrap();
            }
            let results = index.search(&Embedding::new(query), k).unwrap();
            prop_assert!(results.len() <= k.min(index.len()));
            for pair in results.windows(2) {
                prop_assert!(
                    pair[0].score > pair[1].score
                        || (pair[0].score == pair[1].score && pair[0].vector_id < pair[1].vector_id)
                );
            }
        }
    }
}
