//! CLI module for LecturMate.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// LecturMate - question answering over your course material
///
/// Load lecture notes, PDFs and YouTube transcripts, then search them or ask
/// questions answered only from what you loaded.
#[derive(Parser, Debug)]
#[command(name = "lecturmate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "LECTURMATE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a source into chunks and print them
    Chunk {
        /// Text/Markdown file, PDF, or YouTube URL/ID
        input: String,

        /// Characters per chunk (default from config)
        #[arg(long, allow_negative_numbers = true)]
        size: Option<i64>,

        /// Characters shared by consecutive chunks (default from config)
        #[arg(long, allow_negative_numbers = true)]
        overlap: Option<i64>,

        /// Check that the chunks stitch back into the original text
        #[arg(long)]
        verify: bool,
    },

    /// Search loaded sources for the passages closest to a query
    Search {
        /// Search query
        query: String,

        /// Sources to load (files, YouTube URLs or IDs)
        #[arg(short, long = "source", required = true, num_args = 1..)]
        sources: Vec<String>,

        /// Maximum number of results (default from config)
        #[arg(short = 'k', long = "top-k")]
        k: Option<usize>,

        /// Minimum similarity score
        #[arg(short, long, allow_negative_numbers = true)]
        min_score: Option<f32>,
    },

    /// Ask a question answered from the given sources
    Ask {
        /// The question to ask
        question: String,

        /// Sources to load (files, YouTube URLs or IDs)
        #[arg(short, long = "source", required = true, num_args = 1..)]
        sources: Vec<String>,

        /// Number of context chunks to include (default from config)
        #[arg(short = 'k', long = "top-k")]
        k: Option<usize>,

        /// Generation model to use
        #[arg(long)]
        model: Option<String>,
    },

    /// Start an interactive session
    Chat {
        /// Sources to load before the first question
        #[arg(short, long = "source", num_args = 1..)]
        sources: Vec<String>,

        /// Generation model to use
        #[arg(long)]
        model: Option<String>,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Sources to load at startup
        #[arg(short, long = "source", num_args = 1..)]
        sources: Vec<String>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
