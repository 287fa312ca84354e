//! The chunk/vector index pair and its copy-on-write publication handle.

use super::{search, search_with_threshold, ScoredResult};
use crate::chunking::Chunk;
use crate::error::{LecturMateError, Result};
use std::sync::{Arc, RwLock};

/// Chunks and their embeddings, kept index-aligned.
///
/// `vectors[i]` is the embedding of `chunks[i]` for every `i`. The pair is
/// immutable once built; a changed source set produces a new `Index`.
#[derive(Debug, Clone)]
pub struct Index {
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    dimensions: usize,
}

impl Index {
    /// Build an index, checking that every chunk has exactly one vector and
    /// that all vectors share one dimensionality.
    pub fn new(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != vectors.len() {
            return Err(LecturMateError::IndexMisaligned {
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }

        let dimensions = vectors.first().map(|v| v.len()).unwrap_or(0);
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
            return Err(LecturMateError::DimensionMismatch {
                expected: dimensions,
                actual: bad.len(),
            });
        }

        Ok(Self {
            chunks,
            vectors,
            dimensions,
        })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Embedding dimensionality (0 for an empty index).
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Top-`k` chunks for a query vector.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredResult>> {
        search(query, &self.vectors, &self.chunks, k)
    }

    /// Top-`k` chunks for a query vector, dropping those under `min_score`.
    pub fn search_with_threshold(
        &self,
        query: &[f32],
        k: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredResult>> {
        search_with_threshold(query, &self.vectors, &self.chunks, k, min_score)
    }
}

#[derive(Debug, Default)]
struct Published {
    version: u64,
    index: Option<Arc<Index>>,
}

/// Shared slot holding the current index.
///
/// Rebuilds construct a complete `Index` first and then replace the slot in a
/// single write. Readers hold an `Arc` snapshot, so an in-flight query keeps
/// seeing the chunks and vectors of one build even while a new one is published.
#[derive(Debug, Default)]
pub struct IndexHandle {
    slot: RwLock<Published>,
}

impl IndexHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current index and return the new version number.
    pub fn publish(&self, index: Index) -> u64 {
        let index = Arc::new(index);
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        slot.version += 1;
        slot.index = Some(index);
        slot.version
    }

    /// Drop the current index, e.g. when the last source is removed.
    pub fn clear(&self) -> u64 {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        slot.version += 1;
        slot.index = None;
        slot.version
    }

    /// The index as of now, if any.
    pub fn snapshot(&self) -> Option<Arc<Index>> {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .index
            .clone()
    }

    /// Number of times the slot has been replaced.
    pub fn version(&self) -> u64 {
        self.slot.read().unwrap_or_else(|e| e.into_inner()).version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index(label: &str) -> Index {
        let chunks = vec![
            Chunk::new(format!("{} a", label), 0, 0, 3),
            Chunk::new(format!("{} b", label), 1, 3, 6),
        ];
        Index::new(chunks, vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap()
    }

    #[test]
    fn test_index_rejects_misaligned_pair() {
        let chunks = vec![Chunk::new("a".to_string(), 0, 0, 1)];
        let err = Index::new(chunks, vec![]).unwrap_err();
        assert!(matches!(err, LecturMateError::IndexMisaligned { .. }));
    }

    #[test]
    fn test_index_rejects_mixed_dimensions() {
        let chunks = vec![
            Chunk::new("a".to_string(), 0, 0, 1),
            Chunk::new("b".to_string(), 1, 1, 2),
        ];
        let err = Index::new(chunks, vec![vec![1.0], vec![1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, LecturMateError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_dimensions_come_from_the_vectors() {
        assert_eq!(sample_index("x").dimensions(), 2);
        assert_eq!(Index::new(vec![], vec![]).unwrap().dimensions(), 0);
    }

    #[test]
    fn test_snapshot_survives_publish() {
        let handle = IndexHandle::new();
        assert_eq!(handle.publish(sample_index("old")), 1);

        let before = handle.snapshot().unwrap();
        assert_eq!(handle.publish(sample_index("new")), 2);

        assert_eq!(before.chunks()[0].text, "old a");
        assert_eq!(handle.snapshot().unwrap().chunks()[0].text, "new a");

        let results = before.search(&[0.0, 1.0], 1).unwrap();
        assert_eq!(results[0].chunk_text, "old b");
    }

    #[test]
    fn test_clear_drops_index() {
        let handle = IndexHandle::new();
        assert!(handle.snapshot().is_none());
        handle.publish(sample_index("x"));
        handle.clear();
        assert!(handle.snapshot().is_none());
        assert_eq!(handle.version(), 2);
    }

    #[test]
    fn test_concurrent_readers_see_whole_builds() {
        let handle = Arc::new(IndexHandle::new());
        handle.publish(sample_index("v0"));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let handle = Arc::clone(&handle);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let index = handle.snapshot().unwrap();
                        let label = index.chunks()[0].text.split(' ').next().unwrap().to_string();
                        assert_eq!(index.chunks()[1].text, format!("{} b", label));
                        assert_eq!(index.len(), index.vectors().len());
                    }
                })
            })
            .collect();

        for i in 1..50 {
            handle.publish(sample_index(&format!("v{}", i)));
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
