//! Plain text and Markdown files.

use super::{
    expand_input, extension, file_identity, SourceDocument, SourceKind, SourceResult, TextSource,
};
use crate::error::SourceError;
use async_trait::async_trait;
use tracing::info;

const EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

/// Local UTF-8 text file source.
pub struct PlainTextSource;

impl PlainTextSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextSource for PlainTextSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Text
    }

    fn can_handle(&self, input: &str) -> bool {
        extension(&expand_input(input))
            .map(|ext| EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    async fn load(&self, input: &str) -> SourceResult<SourceDocument> {
        let path = expand_input(input);
        let (id, name, size) = file_identity(&path)?;

        if !self.can_handle(input) {
            return Err(SourceError::UnsupportedFormat(format!(
                "{} is not a text file",
                path.display()
            )));
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| SourceError::ReadError(format!("{}: {}", path.display(), e)))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            SourceError::ReadError(format!("{} is not valid UTF-8: {}", path.display(), e))
        })?;

        let doc = SourceDocument::new(id, name, SourceKind::Text, text).with_size(size);
        info!(
            "Loaded {}: {} characters, {} words",
            doc.name,
            doc.char_count(),
            doc.word_count()
        );
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.txt");
        std::fs::write(&path, "Line one.\n\nLine two.").unwrap();

        let doc = PlainTextSource::new()
            .load(path.to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(doc.kind, SourceKind::Text);
        assert_eq!(doc.name, "lecture.txt");
        assert_eq!(doc.text, "Line one.\n\nLine two.");
        assert_eq!(doc.size_bytes, Some(20));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = PlainTextSource::new()
            .load("/no/such/lecture.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b").unwrap();

        let err = PlainTextSource::new()
            .load(path.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = PlainTextSource::new()
            .load(path.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::ReadError(_)));
    }
}
