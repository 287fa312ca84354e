//! LecturMate CLI entry point.

use anyhow::Result;
use clap::Parser;
use lecturmate::cli::{commands, Cli, Commands};
use lecturmate::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging; -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("lecturmate={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    // Config commands must work even when the file holds invalid values
    if let Commands::Config { action } = &cli.command {
        return commands::run_config(action, config_path, settings);
    }
    if let Commands::Doctor = &cli.command {
        let path = config_path.unwrap_or_else(Settings::default_config_path);
        return commands::run_doctor(&settings, &path).await;
    }

    settings.validate()?;

    // Execute command
    match &cli.command {
        Commands::Chunk {
            input,
            size,
            overlap,
            verify,
        } => {
            commands::run_chunk(input, *size, *overlap, *verify, settings).await?;
        }

        Commands::Search {
            query,
            sources,
            k,
            min_score,
        } => {
            commands::run_search(query, sources, *k, *min_score, settings).await?;
        }

        Commands::Ask {
            question,
            sources,
            k,
            model,
        } => {
            commands::run_ask(question, sources, *k, model.clone(), settings).await?;
        }

        Commands::Chat { sources, model } => {
            commands::run_chat(sources, model.clone(), settings).await?;
        }

        Commands::Serve { host, port, sources } => {
            commands::run_serve(host, *port, sources, settings).await?;
        }

        Commands::Doctor | Commands::Config { .. } => {}
    }

    Ok(())
}
