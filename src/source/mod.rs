//! Text sources for LecturMate.
//!
//! Each source turns an input (file path, URL, video ID) into a plain-text
//! [`SourceDocument`]. Failures are reported as a typed [`SourceError`], never as
//! text inside the document.

mod corpus;
mod pdf;
mod text;
mod youtube;

pub use corpus::{Corpus, SourceSpan, SOURCE_SEPARATOR};
pub use pdf::PdfSource;
pub use text::PlainTextSource;
pub use youtube::{parse_json3, TranscriptEntry, YoutubeSource};

use crate::error::SourceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Result type for source loading.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Kind of text source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Text,
    Pdf,
    YouTube,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Text => write!(f, "text"),
            SourceKind::Pdf => write!(f, "pdf"),
            SourceKind::YouTube => write!(f, "youtube"),
        }
    }
}

/// A loaded document ready for chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Stable identifier (canonical path or video ID).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Kind of source.
    pub kind: SourceKind,
    /// Extracted text.
    pub text: String,
    /// Size of the input on disk, when it is a file.
    pub size_bytes: Option<u64>,
    /// When the document was loaded.
    pub added_at: DateTime<Utc>,
}

impl SourceDocument {
    /// Create a document loaded now.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: SourceKind,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            text: text.into(),
            size_bytes: None,
            added_at: Utc::now(),
        }
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// Number of characters in the extracted text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Number of whitespace-separated words in the extracted text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Trait for text source providers.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Get the source kind.
    fn kind(&self) -> SourceKind;

    /// Check if this source can handle the given input.
    fn can_handle(&self, input: &str) -> bool;

    /// Load the input into a document.
    async fn load(&self, input: &str) -> SourceResult<SourceDocument>;
}

/// Detect the appropriate source for the given input.
///
/// Existing files are matched by extension before the input is tried as a
/// YouTube URL or video ID.
pub fn detect_source(input: &str) -> SourceResult<Box<dyn TextSource>> {
    let path = expand_input(input);

    if path.is_file() {
        let pdf = PdfSource::new();
        if pdf.can_handle(input) {
            return Ok(Box::new(pdf));
        }
        let text = PlainTextSource::new();
        if text.can_handle(input) {
            return Ok(Box::new(text));
        }
        return Err(SourceError::UnsupportedFormat(format!(
            "{} (expected .txt, .md or .pdf)",
            input
        )));
    }

    let youtube = YoutubeSource::new();
    if youtube.can_handle(input) {
        return Ok(Box::new(youtube));
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        return Err(SourceError::UnsupportedFormat(format!(
            "{} (only YouTube URLs are supported)",
            input
        )));
    }

    Err(SourceError::NotFound(input.to_string()))
}

/// Detect the source for `input` and load it.
pub async fn load_source(input: &str) -> SourceResult<SourceDocument> {
    detect_source(input)?.load(input).await
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Expand `~` in a path-like input.
pub(crate) fn expand_input(input: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(input.trim()).to_string())
}

/// Lowercased extension of a path, if any.
pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Check that a file exists and return its canonical identifier and display name.
pub(crate) fn file_identity(path: &Path) -> SourceResult<(String, String, u64)> {
    let metadata = std::fs::metadata(path)
        .map_err(|_| SourceError::NotFound(path.display().to_string()))?;
    if !metadata.is_file() {
        return Err(SourceError::NotFound(format!(
            "{} is not a file",
            path.display()
        )));
    }

    let id = std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| id.clone());

    Ok((id, name, metadata.len()))
}
