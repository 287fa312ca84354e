//! LecturMate - question answering over your course material
//!
//! A local-first CLI tool for loading lecture notes, PDFs and YouTube
//! transcripts and answering questions from them alone.
//!
//! # Overview
//!
//! LecturMate allows you to:
//! - Load plain text, Markdown, PDF files and YouTube transcripts
//! - Split them into overlapping fixed-size chunks
//! - Search them semantically with cosine similarity over embeddings
//! - Ask questions answered only from the retrieved passages
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `source` - Text sources (files, PDFs, YouTube) and the combined corpus
//! - `chunking` - Sliding-window chunking
//! - `embedding` - Embedding generation
//! - `retrieval` - Top-k cosine retrieval and the published index
//! - `generation` - Answer generation
//! - `rag` - RAG engine for question answering
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use lecturmate::config::Settings;
//! use lecturmate::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     orchestrator.add_source("lecture-notes.md").await?;
//!     let response = orchestrator.ask("What is entropy?").await?;
//!     println!("{}", response.format_for_display());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod ollama;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod retrieval;
pub mod source;

pub use error::{LecturMateError, Result};
