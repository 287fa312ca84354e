//! Local embeddings served by Ollama (`/api/embed`).

use super::{check_batch, Embedder};
use crate::error::{LecturMateError, Result};
use crate::ollama::{OllamaClient, DEFAULT_BASE_URL};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Inputs per request; keeps request bodies small on long documents.
const BATCH_SIZE: usize = 64;

/// Ollama-based embedder.
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    /// Create an embedder for the `all-minilm` model (384 dimensions) on the default server.
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_BASE_URL, "all-minilm", 384)
    }

    /// Create an embedder with a custom server, model and dimensions.
    pub fn with_config(base_url: &str, model: &str, dimensions: usize) -> Result<Self> {
        Ok(Self {
            client: OllamaClient::new(base_url)?,
            model: model.to_string(),
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| LecturMateError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len(), model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(BATCH_SIZE) {
            let request = EmbedRequest {
                model: &self.model,
                input: batch,
            };
            let response: EmbedResponse = self
                .client
                .post_json("api/embed", &request)
                .await
                .map_err(|e| LecturMateError::Embedding(e.to_string()))?;
            all_embeddings.extend(response.embeddings);
        }

        check_batch(texts.len(), &all_embeddings, self.dimensions)?;

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
