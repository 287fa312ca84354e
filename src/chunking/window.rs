//! Fixed-size sliding window over character positions.

use super::{Chunk, Chunker, ChunkingConfig};
use crate::error::Result;

/// Sliding-window chunker.
///
/// Emits windows of `chunk_size` characters that advance by
/// `chunk_size - overlap`. The final window is clamped at the end of the text.
#[derive(Debug, Clone, Default)]
pub struct SlidingWindowChunker {
    config: ChunkingConfig,
}

impl SlidingWindowChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }
}

impl Chunker for SlidingWindowChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        // Byte position of every character, plus the end of the string, so
        // character offsets can slice the original text directly.
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;

        let mut chunks = Vec::with_capacity(self.config.expected_chunks(char_count));
        let mut start = 0;

        while start < char_count {
            let end = (start + self.config.chunk_size()).min(char_count);
            chunks.push(Chunk::new(
                text[boundaries[start]..boundaries[end]].to_string(),
                chunks.len(),
                start,
                end,
            ));
            start += self.config.step();
        }

        chunks
    }

    fn config(&self) -> ChunkingConfig {
        self.config
    }
}

/// Split `text` into overlapping windows.
///
/// Fails with `InvalidConfiguration` before emitting anything if `chunk_size`
/// is zero or `overlap >= chunk_size`. An empty text yields no chunks.
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    let config = ChunkingConfig::new(chunk_size, overlap)?;
    Ok(SlidingWindowChunker::new(config).chunk(text))
}

/// Reassemble the source text from its chunks by skipping, at each boundary,
/// whatever the previous chunks already covered.
pub fn stitch(chunks: &[Chunk]) -> String {
    let mut text = String::new();
    let mut covered = 0;

    for chunk in chunks {
        if chunk.end_offset <= covered {
            continue;
        }
        let skip = covered.saturating_sub(chunk.start_offset);
        text.extend(chunk.text.chars().skip(skip));
        covered = chunk.end_offset;
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LecturMateError;

    const FOX: &str = "The quick brown fox jumps over the lazy dog";

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunks = split("", 10, 3).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(
            split(FOX, 10, 10),
            Err(LecturMateError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            split(FOX, 5, 7),
            Err(LecturMateError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            split(FOX, 0, 0),
            Err(LecturMateError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_fox_sentence_boundaries() {
        let chunk_size = 10;
        let overlap = 3;
        let step = chunk_size - overlap;
        let chars: Vec<char> = FOX.chars().collect();

        let chunks = split(FOX, chunk_size, overlap).unwrap();
        assert_eq!(chunks.len(), chars.len().div_ceil(step));
        assert_eq!(chunks.len(), 7);

        for (i, chunk) in chunks.iter().enumerate() {
            let start = i * step;
            let end = (start + chunk_size).min(chars.len());
            let expected: String = chars[start..end].iter().collect();

            assert_eq!(chunk.index, i);
            assert_eq!(chunk.start_offset, start);
            assert_eq!(chunk.end_offset, end);
            assert_eq!(chunk.text, expected);
        }

        assert_eq!(chunks[0].text, "The quick ");
        assert_eq!(stitch(&chunks), FOX);
    }

    #[test]
    fn test_short_text_is_a_single_chunk() {
        let chunks = split("abc", 10, 9).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "abc");
        assert_eq!(chunks[0].end_offset, 3);
    }

    #[test]
    fn test_consecutive_chunks_share_overlap() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = split(text, 8, 3).unwrap();

        for pair in chunks.windows(2) {
            if pair[0].start_offset + 8 <= text.len() && pair[1].char_len() >= 3 {
                let tail: String = pair[0].text.chars().skip(5).collect();
                let head: String = pair[1].text.chars().take(3).collect();
                assert_eq!(tail, head);
            }
        }
    }

    #[test]
    fn test_whitespace_is_preserved() {
        let text = "  a\n\n b  ";
        let chunks = split(text, 4, 1).unwrap();
        assert_eq!(chunks[0].text, "  a\n");
        assert_eq!(stitch(&chunks), text);
    }

    #[test]
    fn test_multibyte_characters_use_char_offsets() {
        let text = "héllo wörld ✓✓";
        let chunks = split(text, 5, 2).unwrap();

        assert_eq!(chunks[0].text, "héllo");
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 5));
        assert_eq!(stitch(&chunks), text);
    }
}
