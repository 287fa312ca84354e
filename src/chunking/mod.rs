//! Sliding-window chunking for breaking source text into searchable segments.
//!
//! The chunker works on raw character offsets. It does not trim, clean or
//! normalize whitespace; that belongs to the ingestion side.

mod window;

pub use window::{split, stitch, SlidingWindowChunker};

use crate::error::{LecturMateError, Result};
use serde::{Deserialize, Serialize};

/// A contiguous window of a source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of this chunk.
    pub text: String,
    /// Position of this chunk in generation order.
    pub index: usize,
    /// Character offset of the first character in the source text.
    pub start_offset: usize,
    /// Character offset one past the last character in the source text.
    pub end_offset: usize,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(text: String, index: usize, start_offset: usize, end_offset: usize) -> Self {
        Self {
            text,
            index,
            start_offset,
            end_offset,
        }
    }

    /// Length of this chunk in characters.
    pub fn char_len(&self) -> usize {
        self.end_offset - self.start_offset
    }
}

/// Validated window parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkingConfig {
    /// Create a config, rejecting a zero chunk size or an overlap that would
    /// stop the window from advancing.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(LecturMateError::InvalidConfiguration(
                "chunk_size must be a positive integer".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(LecturMateError::InvalidConfiguration(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Build a config from signed values, as they arrive from config files and
    /// request bodies.
    pub fn from_signed(chunk_size: i64, overlap: i64) -> Result<Self> {
        if chunk_size <= 0 {
            return Err(LecturMateError::InvalidConfiguration(format!(
                "chunk_size must be a positive integer, got {}",
                chunk_size
            )));
        }
        if overlap < 0 {
            return Err(LecturMateError::InvalidConfiguration(format!(
                "overlap must not be negative, got {}",
                overlap
            )));
        }
        Self::new(chunk_size as usize, overlap as usize)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance the window advances between consecutive chunks. Always positive.
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Number of chunks `split` produces for a text of `char_count` characters.
    pub fn expected_chunks(&self, char_count: usize) -> usize {
        char_count.div_ceil(self.step())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 100,
        }
    }
}

/// Trait for text chunking implementations.
pub trait Chunker: Send + Sync {
    /// Split a text into an ordered sequence of chunks.
    fn chunk(&self, text: &str) -> Vec<Chunk>;

    /// The window parameters this chunker uses.
    fn config(&self) -> ChunkingConfig;
}

/// Create the default chunker for a config.
pub fn create_chunker(config: ChunkingConfig) -> Box<dyn Chunker> {
    Box::new(SlidingWindowChunker::new(config))
}
