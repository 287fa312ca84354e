//! RAG (Retrieval-Augmented Generation) for question answering with sources.
//!
//! Retrieves the chunks closest to a question and asks a generator to answer
//! from them alone.

pub mod context;
mod response;

pub use context::ContextBuilder;
pub use response::{RagEngine, RagResponse};

use crate::chunking::Chunk;
use crate::retrieval::ScoredResult;
use crate::source::Corpus;
use serde::{Deserialize, Serialize};

/// A retrieved chunk with the source it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextChunk {
    /// Identifier of the source containing the chunk start.
    pub source_id: Option<String>,
    /// Display name of that source.
    pub source_name: Option<String>,
    /// Position of the chunk in the index.
    pub chunk_index: usize,
    /// Character offsets in the combined text.
    pub start_offset: usize,
    pub end_offset: usize,
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
}

impl ContextChunk {
    /// Attribute a ranked result to its chunk and source.
    pub fn from_result(result: ScoredResult, chunk: &Chunk, corpus: &Corpus) -> Self {
        let span = corpus.source_at(chunk.start_offset);
        Self {
            source_id: span.map(|s| s.source_id.clone()),
            source_name: span.map(|s| s.name.clone()),
            chunk_index: result.index,
            start_offset: chunk.start_offset,
            end_offset: chunk.end_offset,
            content: result.chunk_text,
            score: result.score,
        }
    }

    /// Source name, or a placeholder when the chunk cannot be attributed.
    pub fn source_label(&self) -> &str {
        self.source_name.as_deref().unwrap_or("unknown source")
    }
}
