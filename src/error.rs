//! Error types for LecturMate.

use thiserror::Error;

/// Library-level error type for LecturMate operations.
#[derive(Error, Debug)]
pub enum LecturMateError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No chunks available: load a source first")]
    EmptyCorpus,

    #[error("Dimension mismatch: expected vectors of length {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index is misaligned: {chunks} chunks but {vectors} vectors")]
    IndexMisaligned { chunks: usize, vectors: usize },

    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Ollama error: {0}")]
    Ollama(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Typed failure reported by a text source.
///
/// Ingestion never signals failure through the returned text itself.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Read failed: {0}")]
    ReadError(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),
}

/// Result type alias for LecturMate operations.
pub type Result<T> = std::result::Result<T, LecturMateError>;
