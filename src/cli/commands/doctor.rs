//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{Provider, Settings};
use crate::ollama::OllamaClient;
use console::style;
use std::path::Path;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("LecturMate Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    // Missing ingestion tools only disable one kind of source
    println!("{}", style("External Tools").bold());
    let tool_checks = vec![
        check_tool("pdftotext", "-v", "PDF sources", install_hint_poppler()),
        check_tool("yt-dlp", "--version", "YouTube sources", install_hint_ytdlp()),
    ];
    for check in &tool_checks {
        check.print();
    }
    checks.extend(tool_checks);

    println!();

    println!("{}", style("Model Providers").bold());
    let provider_checks = check_providers(settings).await;
    for check in &provider_checks {
        check.print();
    }
    checks.extend(provider_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![check_config_file(config_path), check_settings(settings)];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using LecturMate.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! LecturMate is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available. Missing tools are warnings.
fn check_tool(name: &str, version_arg: &str, needed_for: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            // pdftotext prints its version to stderr
            let text = if output.stdout.is_empty() {
                String::from_utf8_lossy(&output.stderr).to_string()
            } else {
                String::from_utf8_lossy(&output.stdout).to_string()
            };
            let version = text.lines().next().unwrap_or("installed").trim().to_string();

            let version_display = if version.chars().count() > 50 {
                format!("{}...", version.chars().take(50).collect::<String>())
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::warning(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::warning(name, &format!("not found ({} unavailable)", needed_for), hint)
        }
        Err(e) => CheckResult::warning(name, &format!("error: {}", e), hint),
    }
}

/// Check that the configured providers are reachable.
async fn check_providers(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let mut ollama_urls = Vec::new();
    if settings.embedding.provider == Provider::Ollama {
        ollama_urls.push(settings.embedding.base_url.clone());
    }
    if settings.generation.provider == Provider::Ollama
        && !ollama_urls.contains(&settings.generation.base_url)
    {
        ollama_urls.push(settings.generation.base_url.clone());
    }

    for url in &ollama_urls {
        results.push(check_ollama(url).await);
    }

    if settings.embedding.provider == Provider::OpenAI
        || settings.generation.provider == Provider::OpenAI
    {
        results.push(check_openai_api_key());
    }

    results
}

/// Check if an Ollama server answers at `base_url`.
async fn check_ollama(base_url: &str) -> CheckResult {
    match OllamaClient::new(base_url) {
        Ok(client) if client.is_available().await => {
            CheckResult::ok("Ollama", &format!("reachable at {}", base_url))
        }
        Ok(_) => CheckResult::error(
            "Ollama",
            &format!("not reachable at {}", base_url),
            "Start it with: ollama serve (and pull the models, e.g. ollama pull llama3.2)",
        ),
        Err(e) => CheckResult::error(
            "Ollama",
            &e.to_string(),
            "Fix the base_url in the config file",
        ),
    }
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: lecturmate config edit",
        )
    }
}

/// Check the loaded settings.
fn check_settings(settings: &Settings) -> CheckResult {
    match settings.validate() {
        Ok(()) => CheckResult::ok(
            "Settings",
            &format!(
                "chunks of {} chars, overlap {}, top {}",
                settings.chunking.chunk_size, settings.chunking.overlap, settings.retrieval.top_k
            ),
        ),
        Err(e) => CheckResult::error(
            "Settings",
            &e.to_string(),
            "Fix with: lecturmate config edit",
        ),
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for pdftotext.
fn install_hint_poppler() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install poppler"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install poppler-utils (or your package manager)"
    } else {
        "Install from: https://poppler.freedesktop.org"
    }
}
