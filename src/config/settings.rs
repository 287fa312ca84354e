//! Configuration settings for LecturMate.

use crate::chunking::ChunkingConfig;
use crate::error::{LecturMateError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Sliding-window chunking settings.
///
/// Kept signed so that a negative value in the config file is reported as an
/// invalid configuration rather than a parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Characters per chunk.
    pub chunk_size: i64,
    /// Characters shared by consecutive chunks.
    pub overlap: i64,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 100,
        }
    }
}

impl ChunkingSettings {
    /// Validate into a chunking config.
    pub fn to_config(&self) -> Result<ChunkingConfig> {
        ChunkingConfig::from_signed(self.chunk_size, self.overlap)
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of chunks to retrieve per query.
    pub top_k: i64,
    /// Minimum similarity score for a chunk to be used as context.
    pub min_score: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_score: 0.0,
        }
    }
}

impl RetrievalSettings {
    /// Validated `top_k`.
    pub fn k(&self) -> Result<usize> {
        if self.top_k <= 0 {
            return Err(LecturMateError::InvalidConfiguration(format!(
                "retrieval.top_k must be a positive integer, got {}",
                self.top_k
            )));
        }
        Ok(self.top_k as usize)
    }
}

/// Which backend serves a model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Local Ollama server.
    #[default]
    Ollama,
    /// OpenAI API.
    OpenAI,
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" | "local" => Ok(Provider::Ollama),
            "openai" => Ok(Provider::OpenAI),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Ollama => write!(f, "ollama"),
            Provider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (ollama, openai).
    pub provider: Provider,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Base URL of the Ollama server.
    pub base_url: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Ollama,
            model: "all-minilm".to_string(),
            dimensions: 384,
            base_url: "http://localhost:11434".to_string(),
        }
    }
}

/// Answer generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Generation provider (ollama, openai).
    pub provider: Provider,
    /// LLM model for answers.
    pub model: String,
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Ollama,
            model: "llama3.2".to_string(),
            base_url: "http://localhost:11434".to_string(),
            timeout_seconds: 300,
            temperature: 0.2,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Check the values the core depends on.
    pub fn validate(&self) -> Result<()> {
        self.chunking.to_config()?;
        self.retrieval.k()?;
        if !self.retrieval.min_score.is_finite() {
            return Err(LecturMateError::InvalidConfiguration(
                "retrieval.min_score must be a finite number".to_string(),
            ));
        }
        if self.embedding.model.trim().is_empty() || self.generation.model.trim().is_empty() {
            return Err(LecturMateError::InvalidConfiguration(
                "embedding.model and generation.model must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| LecturMateError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lecturmate")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.chunking.to_config().unwrap().step(), 400);
        assert_eq!(settings.retrieval.k().unwrap(), 3);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [chunking]
            chunk_size = 300
            overlap = 75

            [generation]
            provider = "openai"
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        assert_eq!(settings.chunking.chunk_size, 300);
        assert_eq!(settings.generation.provider, Provider::OpenAI);
        assert_eq!(settings.embedding.provider, Provider::Ollama);
        assert_eq!(settings.retrieval.top_k, 3);
    }

    #[test]
    fn test_negative_values_fail_validation() {
        let settings: Settings =
            toml::from_str("[chunking]\nchunk_size = 10\noverlap = -1\n").unwrap();
        assert!(matches!(
            settings.validate(),
            Err(LecturMateError::InvalidConfiguration(_))
        ));

        let settings: Settings = toml::from_str("[retrieval]\ntop_k = 0\n").unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_overlap_not_below_chunk_size_fails() {
        let settings: Settings =
            toml::from_str("[chunking]\nchunk_size = 10\noverlap = 10\n").unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.retrieval.top_k = 7;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.retrieval.top_k, 7);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert_eq!("local".parse::<Provider>().unwrap(), Provider::Ollama);
        assert!("bogus".parse::<Provider>().is_err());
    }
}
