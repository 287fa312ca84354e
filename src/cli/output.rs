//! CLI output formatting utilities.

use crate::orchestrator::SourceSummary;
use crate::rag::ContextChunk;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a loaded source.
    pub fn source_info(source: &SourceSummary) {
        println!(
            "  {} {} ({}, {} words, {})",
            style("*").cyan(),
            style(&source.name).bold(),
            source.kind,
            source.words,
            style(&source.id).dim()
        );
    }

    /// Print a retrieved chunk.
    pub fn search_result(rank: usize, chunk: &ContextChunk) {
        println!(
            "\n{} {} {} (chunk {}, score: {:.3})",
            style(format!("[{}]", rank)).green(),
            style(chunk.source_label()).bold(),
            style(format!("@{}..{}", chunk.start_offset, chunk.end_offset)).cyan(),
            chunk.chunk_index,
            chunk.score
        );
        println!("   {}", content_preview(&chunk.content, 200));
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) =
            ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
        {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Collapse newlines and truncate on a character boundary with an ellipsis.
pub(crate) fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let cut: String = content.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
