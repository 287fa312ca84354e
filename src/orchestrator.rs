//! Pipeline orchestrator for LecturMate.
//!
//! Owns the loaded sources and coordinates loading, chunking, embedding and
//! indexing, then answers searches and questions against the current index.

use crate::chunking::{create_chunker, Chunker};
use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{LecturMateError, Result, SourceError};
use crate::generation::{create_generator, Generator};
use crate::rag::{ContextBuilder, ContextChunk, RagEngine, RagResponse};
use crate::retrieval::{Index, IndexHandle};
use crate::source::{load_source, Corpus, SourceDocument, SourceKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Summary of a loaded source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub id: String,
    pub name: String,
    pub kind: SourceKind,
    pub characters: usize,
    pub words: usize,
    pub added_at: DateTime<Utc>,
}

impl From<&SourceDocument> for SourceSummary {
    fn from(doc: &SourceDocument) -> Self {
        Self {
            id: doc.id.clone(),
            name: doc.name.clone(),
            kind: doc.kind,
            characters: doc.char_count(),
            words: doc.word_count(),
            added_at: doc.added_at,
        }
    }
}

/// Outcome of a rebuild.
#[derive(Debug, Clone, Copy)]
struct RebuildStats {
    chunks: usize,
    /// Index version after the rebuild.
    version: u64,
}

/// The main orchestrator for the LecturMate pipeline.
pub struct Orchestrator {
    settings: Settings,
    chunker: Box<dyn Chunker>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    rag: RagEngine,
    /// Loaded sources in load order. Held for the whole of a rebuild so
    /// rebuilds never interleave.
    sources: Mutex<Vec<SourceDocument>>,
    /// Combined text of the published index. Written together with every
    /// publish so a reader sees a matching corpus and index.
    corpus: RwLock<Arc<Corpus>>,
    index: IndexHandle,
}

impl Orchestrator {
    /// Create an orchestrator with the providers named in the settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder = create_embedder(&settings.embedding)?;
        let generator = create_generator(&settings.generation, prompts)?;

        info!(
            "Using {} embeddings ({}) and {} generation ({})",
            settings.embedding.provider,
            settings.embedding.model,
            settings.generation.provider,
            settings.generation.model
        );

        Self::with_components(settings, embedder, generator)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        let chunker = create_chunker(settings.chunking.to_config()?);
        let rag = RagEngine::new(
            embedder.clone(),
            generator.clone(),
            settings.retrieval.k()?,
            settings.retrieval.min_score,
        );

        Ok(Self {
            settings,
            chunker,
            embedder,
            generator,
            rag,
            sources: Mutex::new(Vec::new()),
            corpus: RwLock::new(Arc::new(Corpus::default())),
            index: IndexHandle::new(),
        })
    }

    /// Number of times the index has been replaced.
    pub fn index_version(&self) -> u64 {
        self.index.version()
    }

    /// Number of chunks in the current index.
    pub fn chunk_count(&self) -> usize {
        self.index.snapshot().map(|i| i.len()).unwrap_or(0)
    }

    /// Load a source (file path, YouTube URL or video ID) and rebuild the index.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn add_source(&self, input: &str) -> Result<SourceSummary> {
        {
            let sources = self.sources.lock().await;
            if sources.iter().any(|s| s.id == input.trim()) {
                return Err(already_added(input));
            }
        }

        let doc = load_source(input).await?;
        self.add_document(doc).await
    }

    /// Add an already-loaded document and rebuild the index.
    ///
    /// If the rebuild fails the document is not kept.
    pub async fn add_document(&self, doc: SourceDocument) -> Result<SourceSummary> {
        let mut sources = self.sources.lock().await;

        if sources.iter().any(|s| s.id == doc.id) {
            return Err(already_added(&doc.name));
        }
        if doc.text.trim().is_empty() {
            warn!("{} has no text; it will not contribute any chunks", doc.name);
        }

        let summary = SourceSummary::from(&doc);
        sources.push(doc);

        let stats = match self.rebuild(&sources).await {
            Ok(stats) => stats,
            Err(e) => {
                sources.pop();
                return Err(e);
            }
        };

        info!(
            "Added source {} ({} sources, {} chunks, index version {})",
            summary.name,
            sources.len(),
            stats.chunks,
            stats.version
        );
        Ok(summary)
    }

    /// Remove a source by ID or name and rebuild the index.
    ///
    /// Removing the last source clears the index.
    #[instrument(skip(self))]
    pub async fn remove_source(&self, id: &str) -> Result<SourceSummary> {
        let mut sources = self.sources.lock().await;

        let position = sources
            .iter()
            .position(|s| s.id == id)
            .or_else(|| sources.iter().position(|s| s.name == id))
            .ok_or_else(|| SourceError::NotFound(format!("No loaded source named '{}'", id)))?;

        let removed = sources.remove(position);

        let stats = match self.rebuild(&sources).await {
            Ok(stats) => stats,
            Err(e) => {
                sources.insert(position, removed);
                return Err(e);
            }
        };

        info!(
            "Removed source {} ({} chunks left, index version {})",
            removed.name, stats.chunks, stats.version
        );
        Ok(SourceSummary::from(&removed))
    }

    /// Remove every source and clear the index.
    pub async fn clear_sources(&self) -> usize {
        let mut sources = self.sources.lock().await;
        let removed = sources.len();
        sources.clear();
        self.publish(Corpus::default(), None);
        removed
    }

    /// List the loaded sources in load order.
    pub async fn sources(&self) -> Vec<SourceSummary> {
        self.sources
            .lock()
            .await
            .iter()
            .map(SourceSummary::from)
            .collect()
    }

    /// Concatenate, split, embed and publish. The caller holds the sources lock.
    async fn rebuild(&self, sources: &[SourceDocument]) -> Result<RebuildStats> {
        let corpus = Corpus::from_documents(sources);

        if corpus.is_empty() {
            let version = self.publish(corpus, None);
            debug!("No text loaded; index cleared");
            return Ok(RebuildStats {
                chunks: 0,
                version,
            });
        }

        let chunks = self.chunker.chunk(corpus.text());
        info!(
            "Split {} characters into {} chunks",
            corpus.text().chars().count(),
            chunks.len()
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        let index = Index::new(chunks, vectors)?;
        let chunk_count = index.len();
        if index.dimensions() != self.embedder.dimensions() {
            warn!(
                "Embedder returned {}-dimensional vectors but is configured for {}",
                index.dimensions(),
                self.embedder.dimensions()
            );
        }

        let version = self.publish(corpus, Some(index));
        info!("Published index version {} with {} chunks", version, chunk_count);

        Ok(RebuildStats {
            chunks: chunk_count,
            version,
        })
    }

    /// Swap in a new corpus and index together.
    fn publish(&self, corpus: Corpus, index: Option<Index>) -> u64 {
        let mut current = self.corpus.write().unwrap_or_else(|e| e.into_inner());
        *current = Arc::new(corpus);
        match index {
            Some(index) => self.index.publish(index),
            None => self.index.clear(),
        }
    }

    /// The current corpus and index, read as one consistent pair.
    fn snapshot(&self) -> Result<(Arc<Index>, Arc<Corpus>)> {
        let corpus = self.corpus.read().unwrap_or_else(|e| e.into_inner());
        let index = self.index.snapshot().ok_or(LecturMateError::EmptyCorpus)?;
        Ok((index, corpus.clone()))
    }

    /// Retrieve the chunks closest to `query`.
    ///
    /// `k` and `min_score` default to the retrieval settings.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(
        &self,
        query: &str,
        k: Option<usize>,
        min_score: Option<f32>,
    ) -> Result<Vec<ContextChunk>> {
        let (index, corpus) = self.snapshot()?;

        let builder = ContextBuilder::new(self.embedder.clone())
            .with_max_chunks(k.unwrap_or(self.rag.context_builder().max_chunks()))
            .with_min_score(min_score.unwrap_or(self.settings.retrieval.min_score));

        builder.build(query, &index, &corpus).await
    }

    /// Answer a question from the loaded sources.
    pub async fn ask(&self, question: &str) -> Result<RagResponse> {
        let (index, corpus) = self.snapshot()?;
        self.rag.ask(question, &index, &corpus).await
    }

    /// Answer a question using `k` context chunks instead of the configured number.
    pub async fn ask_with_k(&self, question: &str, k: usize) -> Result<RagResponse> {
        let (index, corpus) = self.snapshot()?;
        let engine = RagEngine::new(
            self.embedder.clone(),
            self.generator.clone(),
            k,
            self.settings.retrieval.min_score,
        );
        engine.ask(question, &index, &corpus).await
    }
}

fn already_added(name: &str) -> LecturMateError {
    LecturMateError::InvalidInput(format!("{} is already added", name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct ConstantEmbedder;

    #[async_trait]
    impl Embedder for ConstantEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(LecturMateError::Embedding("offline".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(LecturMateError::Embedding("offline".to_string()))
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct SilentGenerator;

    #[async_trait]
    impl Generator for SilentGenerator {
        async fn generate(&self, _query: &str, _context: &str) -> Result<String> {
            Ok("ok".to_string())
        }

        fn model(&self) -> &str {
            "silent"
        }
    }

    fn orchestrator(embedder: Arc<dyn Embedder>) -> Orchestrator {
        let mut settings = Settings::default();
        settings.chunking.chunk_size = 10;
        settings.chunking.overlap = 2;
        Orchestrator::with_components(settings, embedder, Arc::new(SilentGenerator)).unwrap()
    }

    fn doc(id: &str, text: &str) -> SourceDocument {
        SourceDocument::new(id, format!("{}.txt", id), SourceKind::Text, text)
    }

    #[tokio::test]
    async fn test_rebuild_counts_chunks_across_sources() {
        let orchestrator = orchestrator(Arc::new(ConstantEmbedder));

        // "abcdefgh" + "\n\n" + "ijklmnop" = 18 characters, step 8
        orchestrator.add_document(doc("a", "abcdefgh")).await.unwrap();
        orchestrator.add_document(doc("b", "ijklmnop")).await.unwrap();

        assert_eq!(orchestrator.chunk_count(), 3);
        assert_eq!(orchestrator.index_version(), 2);
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_state() {
        let orchestrator = orchestrator(Arc::new(FailingEmbedder));

        let err = orchestrator.add_document(doc("a", "text")).await.unwrap_err();
        assert!(matches!(err, LecturMateError::Embedding(_)));
        assert!(orchestrator.sources().await.is_empty());
        assert_eq!(orchestrator.index_version(), 0);
    }

    #[tokio::test]
    async fn test_remove_by_name() {
        let orchestrator = orchestrator(Arc::new(ConstantEmbedder));
        orchestrator.add_document(doc("a", "alpha")).await.unwrap();

        let removed = orchestrator.remove_source("a.txt").await.unwrap();
        assert_eq!(removed.id, "a");
        assert!(matches!(
            orchestrator.search("alpha", None, None).await,
            Err(LecturMateError::EmptyCorpus)
        ));
    }

    #[tokio::test]
    async fn test_clear_sources() {
        let orchestrator = orchestrator(Arc::new(ConstantEmbedder));
        orchestrator.add_document(doc("a", "alpha")).await.unwrap();
        orchestrator.add_document(doc("b", "beta")).await.unwrap();

        assert_eq!(orchestrator.clear_sources().await, 2);
        assert_eq!(orchestrator.chunk_count(), 0);
        assert!(matches!(
            orchestrator.ask("anything").await,
            Err(LecturMateError::EmptyCorpus)
        ));
    }
}
