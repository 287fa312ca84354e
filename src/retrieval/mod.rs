//! Brute-force semantic retrieval over chunk embeddings.
//!
//! Scores every chunk against the query with cosine similarity, ranks by score
//! (ties broken by ascending chunk index) and keeps the top `k`.

mod index;

pub use index::{Index, IndexHandle};

use crate::chunking::Chunk;
use crate::error::{LecturMateError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A ranked match for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    /// Text of the matched chunk.
    pub chunk_text: String,
    /// Cosine similarity between the query and the chunk, in [-1, 1].
    pub score: f32,
    /// Index of the chunk in its collection.
    pub index: usize,
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero norm, so a degenerate embedding
/// matches nothing.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    // Accumulate in f64 so large or tiny components keep their norms
    let dot_product: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    let norm_a = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)) as f32
}

/// Rank `chunks` against `query` and return the best `min(k, chunks.len())`.
///
/// `vectors[i]` must be the embedding of `chunks[i]`.
pub fn search(
    query: &[f32],
    vectors: &[Vec<f32>],
    chunks: &[Chunk],
    k: usize,
) -> Result<Vec<ScoredResult>> {
    if chunks.is_empty() {
        return Err(LecturMateError::EmptyCorpus);
    }
    if vectors.len() != chunks.len() {
        return Err(LecturMateError::IndexMisaligned {
            chunks: chunks.len(),
            vectors: vectors.len(),
        });
    }
    if k == 0 {
        return Err(LecturMateError::InvalidConfiguration(
            "k must be a positive integer".to_string(),
        ));
    }
    check_finite(query, "query")?;
    for (i, vector) in vectors.iter().enumerate() {
        if vector.len() != query.len() {
            return Err(LecturMateError::DimensionMismatch {
                expected: query.len(),
                actual: vector.len(),
            });
        }
        check_finite(vector, &format!("chunk {}", i))?;
    }

    let mut scored: Vec<(usize, f32)> = Vec::with_capacity(vectors.len());
    for (i, vector) in vectors.iter().enumerate() {
        let score = cosine_similarity(query, vector);
        // The sort below needs a total order
        if score.is_nan() {
            return Err(LecturMateError::InvalidVector(format!(
                "chunk {} has no defined similarity to the query",
                i
            )));
        }
        scored.push((i, score));
    }

    scored.sort_by(|a, b| rank_order(*a, *b));
    scored.truncate(k);

    Ok(scored
        .into_iter()
        .map(|(i, score)| ScoredResult {
            chunk_text: chunks[i].text.clone(),
            score,
            index: i,
        })
        .collect())
}

/// Like [`search`], but drops ranked results scoring below `min_score`.
///
/// An empty result means nothing was similar enough; an empty collection is
/// still reported as `EmptyCorpus`.
pub fn search_with_threshold(
    query: &[f32],
    vectors: &[Vec<f32>],
    chunks: &[Chunk],
    k: usize,
    min_score: f32,
) -> Result<Vec<ScoredResult>> {
    let mut results = search(query, vectors, chunks, k)?;
    results.retain(|r| r.score >= min_score);
    Ok(results)
}

/// Descending score, then ascending position. Scores are never NaN here, and
/// `-0.0` ties with `0.0`.
fn rank_order(a: (usize, f32), b: (usize, f32)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then(a.0.cmp(&b.0))
}

fn check_finite(vector: &[f32], what: &str) -> Result<()> {
    if vector.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(LecturMateError::InvalidVector(format!(
            "{} contains a non-finite component",
            what
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(n: usize) -> Vec<Chunk> {
        (0..n)
            .map(|i| Chunk::new(format!("chunk {}", i), i, i * 10, i * 10 + 10))
            .collect()
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_norm_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_magnitude_does_not_change_the_score() {
        let huge = cosine_similarity(&[1.0, 1.0], &[1e20, 1e20]);
        assert!((huge - 1.0).abs() < 1e-6);

        let tiny = cosine_similarity(&[1.0, 0.0], &[1e-25, 0.0]);
        assert!((tiny - 1.0).abs() < 1e-6);

        let largest = cosine_similarity(&[f32::MAX, f32::MAX], &[f32::MAX, 0.0]);
        assert!((largest - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_parallel_vectors_win_at_any_scale() {
        let small = vec![vec![0.0, 1.0], vec![1e-25, 1e-26]];
        let top = search(&[1.0, 0.0], &small, &chunks(2), 1).unwrap();
        assert_eq!(top[0].index, 1);
        assert!(top[0].score > 0.99);

        let large = vec![vec![0.0, 1.0], vec![1e20, 1e20]];
        let top = search(&[1.0, 1.0], &large, &chunks(2), 1).unwrap();
        assert_eq!(top[0].index, 1);
        assert!((top[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ranks_by_similarity() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
        let chunks = chunks(3);

        let top = search(&[1.0, 0.0], &vectors, &chunks, 1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].index, 0);
        assert!((top[0].score - 1.0).abs() < 1e-6);

        let top2 = search(&[1.0, 0.0], &vectors, &chunks, 2).unwrap();
        let indices: Vec<usize> = top2.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert!(top2[0].score > top2[1].score);
        assert!((top2[1].score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_k_larger_than_collection_returns_all() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
        let results = search(&[1.0, 0.0], &vectors, &chunks(3), 100).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].index, 1);
    }

    #[test]
    fn test_ties_break_by_index() {
        let vectors = vec![vec![0.5, 0.5], vec![0.5, 0.5], vec![0.5, 0.5]];
        let results = search(&[1.0, 1.0], &vectors, &chunks(3), 3).unwrap();
        let indices: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_single_chunk_is_always_top() {
        let results = search(&[0.0, 1.0], &[vec![1.0, 0.0]], &chunks(1), 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, 0);
        assert_eq!(results[0].chunk_text, "chunk 0");
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let err = search(&[1.0, 0.0], &[], &[], 3).unwrap_err();
        assert!(matches!(err, LecturMateError::EmptyCorpus));
    }

    #[test]
    fn test_dimension_mismatch() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0, 0.0]];
        let err = search(&[1.0, 0.0], &vectors, &chunks(2), 1).unwrap_err();
        assert!(matches!(
            err,
            LecturMateError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_misaligned_arrays() {
        let err = search(&[1.0], &[vec![1.0]], &chunks(2), 1).unwrap_err();
        assert!(matches!(
            err,
            LecturMateError::IndexMisaligned {
                chunks: 2,
                vectors: 1
            }
        ));
    }

    #[test]
    fn test_zero_k_is_rejected() {
        let err = search(&[1.0], &[vec![1.0]], &chunks(1), 0).unwrap_err();
        assert!(matches!(err, LecturMateError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_non_finite_vectors_are_rejected() {
        let err = search(&[f32::NAN], &[vec![1.0]], &chunks(1), 1).unwrap_err();
        assert!(matches!(err, LecturMateError::InvalidVector(_)));
    }

    #[test]
    fn test_threshold_filters_after_ranking() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
        let results = search_with_threshold(&[1.0, 0.0], &vectors, &chunks(3), 3, 0.5).unwrap();
        let indices: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2]);

        let none = search_with_threshold(&[1.0, 0.0], &vectors, &chunks(3), 3, 1.5).unwrap();
        assert!(none.is_empty());
    }
}
