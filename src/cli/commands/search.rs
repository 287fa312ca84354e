//! Search command implementation.

use super::{load_sources, report_error};
use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    sources: &[String],
    k: Option<usize>,
    min_score: Option<f32>,
    settings: Settings,
) -> Result<()> {
    preflight::check_sources(sources)?;
    preflight::check_providers(&settings)?;

    let orchestrator = Orchestrator::new(settings)?;
    load_sources(&orchestrator, sources).await?;

    let spinner = Output::spinner("Searching...");
    let results = orchestrator.search(query, k, min_score).await;
    spinner.finish_and_clear();

    match results {
        Ok(chunks) => {
            if chunks.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", chunks.len()));

                for (rank, chunk) in chunks.iter().enumerate() {
                    Output::search_result(rank + 1, chunk);
                }
            }
        }
        Err(e) => {
            report_error(&e);
            return Err(e.into());
        }
    }

    Ok(())
}
