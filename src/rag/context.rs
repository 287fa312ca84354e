//! Context building for RAG responses.

use super::ContextChunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::retrieval::Index;
use crate::source::Corpus;
use std::sync::Arc;
use tracing::debug;

/// Builds context from search results for RAG.
pub struct ContextBuilder {
    embedder: Arc<dyn Embedder>,
    max_chunks: usize,
    min_score: f32,
}

impl ContextBuilder {
    /// Create a new context builder returning the top 3 chunks.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            max_chunks: 3,
            min_score: 0.0,
        }
    }

    /// Set the maximum number of context chunks.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Set the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn max_chunks(&self) -> usize {
        self.max_chunks
    }

    /// Build context for a query against one index snapshot.
    ///
    /// `corpus` must be the combined text the index was built from.
    pub async fn build(
        &self,
        query: &str,
        index: &Index,
        corpus: &Corpus,
    ) -> Result<Vec<ContextChunk>> {
        let query_embedding = self.embedder.embed(query).await?;

        let results =
            index.search_with_threshold(&query_embedding, self.max_chunks, self.min_score)?;
        debug!("Retrieved {} chunks", results.len());

        let chunks = index.chunks();
        Ok(results
            .into_iter()
            .map(|r| {
                let chunk = &chunks[r.index];
                ContextChunk::from_result(r, chunk, corpus)
            })
            .collect())
    }
}

/// Join chunk texts for the generation prompt.
pub fn format_context_for_prompt(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format context chunks for display to the user.
pub fn format_context_for_display(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            format!(
                "[{}] {} (chunk {}, score: {:.2})\n{}",
                i + 1,
                chunk.source_label(),
                chunk.chunk_index,
                chunk.score,
                chunk.content.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str, score: f32) -> ContextChunk {
        ContextChunk {
            source_id: Some("notes".to_string()),
            source_name: Some("notes.txt".to_string()),
            chunk_index: 4,
            start_offset: 0,
            end_offset: content.chars().count(),
            content: content.to_string(),
            score,
        }
    }

    #[test]
    fn test_prompt_context_is_plain_join() {
        let chunks = vec![chunk("first", 0.9), chunk("second", 0.5)];
        assert_eq!(format_context_for_prompt(&chunks), "first\n\nsecond");
        assert_eq!(format_context_for_prompt(&[]), "");
    }

    #[test]
    fn test_display_context() {
        let display = format_context_for_display(&[chunk("first", 0.875)]);
        assert_eq!(display, "[1] notes.txt (chunk 4, score: 0.88)\nfirst");
    }
}
