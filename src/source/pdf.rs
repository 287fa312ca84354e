//! PDF text extraction via `pdftotext` (poppler-utils).

use super::{
    expand_input, extension, file_identity, normalize_whitespace, SourceDocument, SourceKind,
    SourceResult, TextSource,
};
use crate::error::SourceError;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// PDF file source.
pub struct PdfSource;

impl PdfSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Pages in `pdftotext` output are separated by form feeds.
fn count_pages(raw: &str) -> usize {
    raw.split('\x0c').filter(|page| !page.trim().is_empty()).count()
}

#[async_trait]
impl TextSource for PdfSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Pdf
    }

    fn can_handle(&self, input: &str) -> bool {
        extension(&expand_input(input)).as_deref() == Some("pdf")
    }

    async fn load(&self, input: &str) -> SourceResult<SourceDocument> {
        let path = expand_input(input);
        let (id, name, size) = file_identity(&path)?;

        if !self.can_handle(input) {
            return Err(SourceError::UnsupportedFormat(format!(
                "{} is not a PDF file",
                path.display()
            )));
        }

        debug!("Extracting text from {}", path.display());

        let output = tokio::process::Command::new("pdftotext")
            .args(["-layout", "-enc", "UTF-8"])
            .arg(&path)
            .arg("-")
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SourceError::ToolNotFound("pdftotext".to_string())
                } else {
                    SourceError::ReadError(format!("Failed to run pdftotext: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::ReadError(format!(
                "pdftotext failed on {}: {}",
                path.display(),
                stderr.trim()
            )));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let pages = count_pages(&raw);
        let text = normalize_whitespace(&raw);

        if text.is_empty() {
            warn!("{} contains no extractable text", name);
        }

        let doc = SourceDocument::new(id, name, SourceKind::Pdf, text).with_size(size);
        info!(
            "Extracted {}: {} pages, {} characters, {} words",
            doc.name,
            pages,
            doc.char_count(),
            doc.word_count()
        );
        Ok(doc)
    }
}
