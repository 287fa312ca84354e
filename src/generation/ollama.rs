//! Answer generation through Ollama's `/api/generate`.

use super::Generator;
use crate::config::{GenerationSettings, Prompts};
use crate::error::{LecturMateError, Result};
use crate::ollama::{OllamaClient, DEFAULT_BASE_URL};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Ollama-backed generator.
pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
    temperature: f32,
    prompts: Prompts,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    system: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u64>,
}

impl OllamaGenerator {
    /// Create a generator for `llama3.2` on the default server.
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_BASE_URL, "llama3.2")
    }

    /// Create a generator with a custom server and model.
    pub fn with_config(base_url: &str, model: &str) -> Result<Self> {
        Ok(Self {
            client: OllamaClient::new(base_url)?,
            model: model.to_string(),
            temperature: 0.2,
            prompts: Prompts::default(),
        })
    }

    /// Create a generator from settings.
    pub fn from_settings(settings: &GenerationSettings, prompts: Prompts) -> Result<Self> {
        Ok(Self {
            client: OllamaClient::with_timeout(
                &settings.base_url,
                Duration::from_secs(settings.timeout_seconds),
            )?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            prompts,
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    #[instrument(skip(self, context), fields(model = %self.model))]
    async fn generate(&self, query: &str, context: &str) -> Result<String> {
        info!("Generating answer with {}", self.model);

        let request = GenerateRequest {
            model: &self.model,
            prompt: self.prompts.render_answer(query, context),
            system: &self.prompts.answer.system,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response: GenerateResponse = self
            .client
            .post_json("api/generate", &request)
            .await
            .map_err(|e| match e {
                LecturMateError::Http(err) if err.is_connect() || err.is_timeout() => {
                    LecturMateError::Generation(format!(
                        "Could not reach Ollama at {}: {}",
                        self.client.base_url(),
                        err
                    ))
                }
                other => other,
            })?;

        debug!("Ollama generated {:?} tokens", response.eval_count);
        Ok(response.response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let prompts = Prompts::default();
        let request = GenerateRequest {
            model: "llama3.2",
            prompt: prompts.render_answer("Q?", "C."),
            system: &prompts.answer.system,
            stream: false,
            options: GenerateOptions { temperature: 0.2 },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["stream"], false);
        assert!(json["prompt"].as_str().unwrap().contains("Question: Q?"));
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"model":"llama3.2","response":"Paris.","done":true}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.response, "Paris.");
        assert!(response.eval_count.is_none());
    }

    #[test]
    fn test_generator_creation() {
        let generator = OllamaGenerator::new().unwrap();
        assert_eq!(generator.model(), "llama3.2");
    }
}
