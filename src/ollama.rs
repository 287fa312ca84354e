//! Minimal HTTP client for a local Ollama server.

use crate::error::{LecturMateError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default Ollama endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default timeout for Ollama requests (5 minutes; first calls may load a model).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Shared Ollama connection: an HTTP client and the server base URL.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: Url,
}

impl OllamaClient {
    /// Create a client for `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client for `base_url` with a custom timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            LecturMateError::InvalidConfiguration(format!(
                "Invalid Ollama URL '{}': {}",
                base_url, e
            ))
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LecturMateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path such as `api/generate` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| {
            LecturMateError::InvalidConfiguration(format!(
                "Invalid Ollama endpoint '{}': {}",
                path, e
            ))
        })
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);

        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LecturMateError::Ollama(format!(
                "server returned {}: {}",
                status,
                body.trim()
            )));
        }

        Ok(response.json::<R>().await?)
    }

    /// Check whether the server answers at all.
    pub async fn is_available(&self) -> bool {
        match self.endpoint("api/tags") {
            Ok(url) => self
                .http
                .get(url)
                .send()
                .await
                .map(|r| r.status().is_success())
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}
