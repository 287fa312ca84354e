//! RAG response generation.

use super::{context::format_context_for_prompt, ContextBuilder, ContextChunk};
use crate::embedding::Embedder;
use crate::error::Result;
use crate::generation::Generator;
use crate::retrieval::Index;
use crate::source::Corpus;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Answer returned when retrieval finds nothing above the score threshold.
const NO_CONTEXT_ANSWER: &str =
    "I don't know. None of the loaded sources seem relevant to this question.";

/// RAG engine for question answering.
pub struct RagEngine {
    context_builder: ContextBuilder,
    generator: Arc<dyn Generator>,
}

impl RagEngine {
    /// Create a new RAG engine.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        max_context_chunks: usize,
        min_score: f32,
    ) -> Self {
        let context_builder = ContextBuilder::new(embedder)
            .with_max_chunks(max_context_chunks)
            .with_min_score(min_score);

        Self {
            context_builder,
            generator,
        }
    }

    pub fn context_builder(&self) -> &ContextBuilder {
        &self.context_builder
    }

    /// Ask a single question against one index snapshot.
    #[instrument(skip(self, index, corpus), fields(question = %question))]
    pub async fn ask(&self, question: &str, index: &Index, corpus: &Corpus) -> Result<RagResponse> {
        info!("Processing question: {}", question);

        let context_chunks = self.context_builder.build(question, index, corpus).await?;

        if context_chunks.is_empty() {
            return Ok(RagResponse {
                answer: NO_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let context_text = format_context_for_prompt(&context_chunks);
        let answer = self.generator.generate(question, &context_text).await?;

        debug!("Generated response with {} sources", context_chunks.len());

        Ok(RagResponse {
            answer: answer.trim().to_string(),
            sources: context_chunks,
        })
    }
}

/// A RAG response with answer and sources.
#[derive(Debug, Clone, Serialize)]
pub struct RagResponse {
    /// The generated answer.
    pub answer: String,
    /// Source chunks used for the answer.
    pub sources: Vec<ContextChunk>,
}

impl RagResponse {
    /// Format the response for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for source in &self.sources {
                output.push_str(&format!(
                    "\n{} (chunk {}, score: {:.2})",
                    source.source_label(),
                    source.chunk_index,
                    source.score
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::split;
    use crate::error::LecturMateError;
    use crate::source::{SourceDocument, SourceKind};
    use async_trait::async_trait;

    /// Embeds text as (vowel count, consonant count).
    struct LetterEmbedder;

    #[async_trait]
    impl Embedder for LetterEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let vowels = text.chars().filter(|c| "aeiou".contains(*c)).count() as f32;
            let others = text.chars().filter(|c| c.is_alphabetic()).count() as f32 - vowels;
            Ok(vec![vowels, others])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Echoes the context it was given.
    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn generate(&self, _query: &str, context: &str) -> Result<String> {
            Ok(format!(" {} ", context))
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    async fn build(text: &str) -> (Index, Corpus) {
        let corpus = Corpus::from_documents(&[SourceDocument::new(
            "doc",
            "doc.txt",
            SourceKind::Text,
            text,
        )]);
        let chunks = split(corpus.text(), 4, 0).unwrap();
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = LetterEmbedder.embed_batch(&texts).await.unwrap();
        (Index::new(chunks, vectors).unwrap(), corpus)
    }

    #[tokio::test]
    async fn test_ask_answers_from_best_chunk() {
        let (index, corpus) = build("aaaabbbb").await;
        let engine = RagEngine::new(Arc::new(LetterEmbedder), Arc::new(EchoGenerator), 1, 0.0);

        let response = engine.ask("eeee", &index, &corpus).await.unwrap();
        assert_eq!(response.answer, "aaaa");
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].source_name.as_deref(), Some("doc.txt"));
        assert_eq!(response.sources[0].chunk_index, 0);
    }

    #[tokio::test]
    async fn test_ask_without_relevant_context() {
        let (index, corpus) = build("aaaabbbb").await;
        let engine = RagEngine::new(Arc::new(LetterEmbedder), Arc::new(EchoGenerator), 2, 0.99);

        let response = engine.ask("eebb", &index, &corpus).await.unwrap();
        assert_eq!(response.answer, NO_CONTEXT_ANSWER);
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn test_ask_propagates_retrieval_errors() {
        let (index, corpus) = build("aaaabbbb").await;
        let engine = RagEngine::new(Arc::new(LetterEmbedder), Arc::new(EchoGenerator), 0, 0.0);

        let err = engine.ask("eeee", &index, &corpus).await.unwrap_err();
        assert!(matches!(err, LecturMateError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_format_for_display() {
        let response = RagResponse {
            answer: "Mitochondria.".to_string(),
            sources: vec![ContextChunk {
                source_id: None,
                source_name: None,
                chunk_index: 2,
                start_offset: 10,
                end_offset: 20,
                content: "text".to_string(),
                score: 0.5,
            }],
        };

        let display = response.format_for_display();
        assert!(display.starts_with("Mitochondria."));
        assert!(display.contains("unknown source (chunk 2, score: 0.50)"));
    }
}
