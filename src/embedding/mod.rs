//! Embedding generation for semantic search and retrieval.

mod ollama;
mod openai;

pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingSettings, Provider};
use crate::error::{LecturMateError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
///
/// Implementations must be deterministic for a fixed model, and queries must be
/// embedded with the same model and configuration as the chunks they are
/// compared against.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, one per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Create the embedder described by the settings.
pub fn create_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match settings.provider {
        Provider::Ollama => Arc::new(OllamaEmbedder::with_config(
            &settings.base_url,
            &settings.model,
            settings.dimensions as usize,
        )?),
        Provider::OpenAI => Arc::new(OpenAIEmbedder::with_config(
            &settings.model,
            settings.dimensions as usize,
        )?),
    };
    Ok(embedder)
}

/// Check that a provider returned one vector of the expected size per input.
pub(crate) fn check_batch(
    inputs: usize,
    embeddings: &[Vec<f32>],
    dimensions: usize,
) -> Result<()> {
    if embeddings.len() != inputs {
        return Err(LecturMateError::Embedding(format!(
            "expected {} embeddings, got {}",
            inputs,
            embeddings.len()
        )));
    }
    if let Some(bad) = embeddings.iter().find(|e| e.len() != dimensions) {
        return Err(LecturMateError::DimensionMismatch {
            expected: dimensions,
            actual: bad.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_batch() {
        assert!(check_batch(2, &[vec![0.0; 3], vec![1.0; 3]], 3).is_ok());
        assert!(matches!(
            check_batch(3, &[vec![0.0; 3]], 3),
            Err(LecturMateError::Embedding(_))
        ));
        assert!(matches!(
            check_batch(1, &[vec![0.0; 2]], 3),
            Err(LecturMateError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }
}
