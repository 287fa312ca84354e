//! Answer generation from a question and its retrieved context.

mod ollama;
mod openai;

pub use ollama::OllamaGenerator;
pub use openai::OpenAIGenerator;

use crate::config::{GenerationSettings, Prompts, Provider};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for answer generation backends.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce an answer to `query` grounded in `context`.
    async fn generate(&self, query: &str, context: &str) -> Result<String>;

    /// Model identifier, for display.
    fn model(&self) -> &str;
}

/// Create the generator described by the settings.
pub fn create_generator(
    settings: &GenerationSettings,
    prompts: Prompts,
) -> Result<Arc<dyn Generator>> {
    let generator: Arc<dyn Generator> = match settings.provider {
        Provider::Ollama => Arc::new(OllamaGenerator::from_settings(settings, prompts)?),
        Provider::OpenAI => Arc::new(OpenAIGenerator::from_settings(settings, prompts)?),
    };
    Ok(generator)
}
