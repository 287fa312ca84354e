//! Chunk command implementation.

use crate::chunking::{create_chunker, stitch, ChunkingConfig};
use crate::cli::output::content_preview;
use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::source::load_source;
use anyhow::Result;
use console::style;

/// Run the chunk command.
pub async fn run_chunk(
    input: &str,
    size: Option<i64>,
    overlap: Option<i64>,
    verify: bool,
    settings: Settings,
) -> Result<()> {
    let config = ChunkingConfig::from_signed(
        size.unwrap_or(settings.chunking.chunk_size),
        overlap.unwrap_or(settings.chunking.overlap),
    )?;

    preflight::check_sources(&[input.to_string()])?;

    let spinner = Output::spinner(&format!("Loading {}...", input));
    let doc = load_source(input).await;
    spinner.finish_and_clear();
    let doc = doc?;

    let chunks = create_chunker(config).chunk(&doc.text);

    Output::header(&doc.name);
    Output::kv("Kind", &doc.kind.to_string());
    Output::kv("Characters", &doc.char_count().to_string());
    Output::kv(
        "Window",
        &format!(
            "{} chars, overlap {}, step {}",
            config.chunk_size(),
            config.overlap(),
            config.step()
        ),
    );
    Output::kv("Chunks", &chunks.len().to_string());

    for chunk in &chunks {
        println!(
            "\n{} {}",
            style(format!("#{}", chunk.index)).green().bold(),
            style(format!("[{}..{})", chunk.start_offset, chunk.end_offset)).dim()
        );
        println!("   {}", content_preview(&chunk.text, 120));
    }
    println!();

    if verify {
        if stitch(&chunks) == doc.text {
            Output::success("Chunks stitch back into the original text.");
        } else {
            Output::error("Chunks do not reproduce the original text.");
            anyhow::bail!("chunk verification failed for {}", doc.name);
        }
    }

    Ok(())
}
