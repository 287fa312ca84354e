//! The combined text of all loaded sources.

use super::SourceDocument;
use serde::Serialize;

/// Separator placed between consecutive source texts.
pub const SOURCE_SEPARATOR: &str = "\n\n";

/// Character range of one source inside the combined text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSpan {
    pub source_id: String,
    pub name: String,
    /// First character of the source.
    pub start: usize,
    /// One past the last character of the source.
    pub end: usize,
}

/// Source texts joined in load order, with a table mapping offsets back to sources.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    text: String,
    spans: Vec<SourceSpan>,
}

impl Corpus {
    /// Join the documents' texts with [`SOURCE_SEPARATOR`].
    ///
    /// Documents with empty text contribute nothing and get no span.
    pub fn from_documents(documents: &[SourceDocument]) -> Self {
        let separator_len = SOURCE_SEPARATOR.chars().count();
        let mut text = String::new();
        let mut spans = Vec::with_capacity(documents.len());
        let mut offset = 0;

        for doc in documents.iter().filter(|d| !d.text.is_empty()) {
            if !text.is_empty() {
                text.push_str(SOURCE_SEPARATOR);
                offset += separator_len;
            }
            let len = doc.text.chars().count();
            text.push_str(&doc.text);
            spans.push(SourceSpan {
                source_id: doc.id.clone(),
                name: doc.name.clone(),
                start: offset,
                end: offset + len,
            });
            offset += len;
        }

        Self { text, spans }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[SourceSpan] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The source covering a character offset.
    ///
    /// An offset inside a separator resolves to the source that follows it.
    pub fn source_at(&self, offset: usize) -> Option<&SourceSpan> {
        self.spans.iter().find(|span| offset < span.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;

    fn doc(id: &str, text: &str) -> SourceDocument {
        SourceDocument::new(id, format!("{}.txt", id), SourceKind::Text, text)
    }

    #[test]
    fn test_join_and_spans() {
        let corpus = Corpus::from_documents(&[doc("a", "alpha"), doc("b", "béta")]);

        assert_eq!(corpus.text(), "alpha\n\nbéta");
        assert_eq!(corpus.spans()[0].start, 0);
        assert_eq!(corpus.spans()[0].end, 5);
        assert_eq!(corpus.spans()[1].start, 7);
        assert_eq!(corpus.spans()[1].end, 11);
    }

    #[test]
    fn test_source_at() {
        let corpus = Corpus::from_documents(&[doc("a", "alpha"), doc("b", "beta")]);

        assert_eq!(corpus.source_at(0).unwrap().source_id, "a");
        assert_eq!(corpus.source_at(4).unwrap().source_id, "a");
        assert_eq!(corpus.source_at(5).unwrap().source_id, "b");
        assert_eq!(corpus.source_at(7).unwrap().source_id, "b");
        assert!(corpus.source_at(11).is_none());
    }

    #[test]
    fn test_empty_documents_are_skipped() {
        let corpus = Corpus::from_documents(&[doc("a", ""), doc("b", "beta")]);
        assert_eq!(corpus.text(), "beta");
        assert_eq!(corpus.spans().len(), 1);

        assert!(Corpus::from_documents(&[]).is_empty());
    }
}
