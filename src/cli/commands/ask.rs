//! Ask command implementation.

use super::{load_sources, report_error};
use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    sources: &[String],
    k: Option<usize>,
    model: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(model) = model {
        settings.generation.model = model;
    }
    if let Some(k) = k {
        settings.retrieval.top_k = k as i64;
    }

    if let Err(e) = preflight::check_sources(sources).and(preflight::check_providers(&settings)) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lecturmate doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    load_sources(&orchestrator, sources).await?;

    let spinner = Output::spinner("Thinking...");
    let response = orchestrator.ask(question).await;
    spinner.finish_and_clear();

    match response {
        Ok(response) => {
            println!("\n{}\n", response.answer);

            if !response.sources.is_empty() {
                Output::header("Sources");
                for (rank, source) in response.sources.iter().enumerate() {
                    Output::search_result(rank + 1, source);
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
