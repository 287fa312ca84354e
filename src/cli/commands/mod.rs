//! CLI command implementations.

mod ask;
mod chat;
mod chunk;
mod config;
mod doctor;
mod search;
mod serve;

pub use ask::run_ask;
pub use chat::run_chat;
pub use chunk::run_chunk;
pub use config::run_config;
pub use doctor::run_doctor;
pub use search::run_search;
pub use serve::run_serve;

use crate::cli::Output;
use crate::error::LecturMateError;
use crate::orchestrator::Orchestrator;

/// Load every input into the orchestrator, stopping at the first failure.
pub(crate) async fn load_sources(
    orchestrator: &Orchestrator,
    inputs: &[String],
) -> anyhow::Result<()> {
    for input in inputs {
        let spinner = Output::spinner(&format!("Loading {}...", input));
        let result = orchestrator.add_source(input).await;
        spinner.finish_and_clear();

        match result {
            Ok(summary) => Output::success(&format!(
                "Loaded {} ({} words)",
                summary.name, summary.words
            )),
            Err(e) => {
                Output::error(&format!("Failed to load {}: {}", input, e));
                return Err(e.into());
            }
        }
    }
    Ok(())
}

/// Print a friendlier message for errors users commonly hit.
pub(crate) fn report_error(e: &LecturMateError) {
    match e {
        LecturMateError::EmptyCorpus => {
            Output::warning("No text loaded. Please add sources first.");
        }
        LecturMateError::Source(source_error) => {
            Output::error(&source_error.to_string());
            Output::info("Run 'lecturmate doctor' for detailed diagnostics.");
        }
        other => Output::error(&other.to_string()),
    }
}
