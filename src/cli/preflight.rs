//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::{Provider, Settings};
use crate::error::{LecturMateError, Result, SourceError};
use crate::source::{detect_source, SourceKind};
use std::process::Command;

/// Check that the tools needed to load `inputs` are installed.
///
/// Inputs that cannot be detected are left for the loader to report.
pub fn check_sources(inputs: &[String]) -> Result<()> {
    let mut needs_pdf = false;
    let mut needs_youtube = false;

    for input in inputs {
        match detect_source(input).map(|s| s.kind()) {
            Ok(SourceKind::Pdf) => needs_pdf = true,
            Ok(SourceKind::YouTube) => needs_youtube = true,
            _ => {}
        }
    }

    if needs_pdf {
        check_tool("pdftotext", "-v")?;
    }
    if needs_youtube {
        check_tool("yt-dlp", "--version")?;
    }
    Ok(())
}

/// Check the credentials the configured providers need.
pub fn check_providers(settings: &Settings) -> Result<()> {
    if settings.embedding.provider == Provider::OpenAI
        || settings.generation.provider == Provider::OpenAI
    {
        check_api_key()?;
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(LecturMateError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(LecturMateError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str, version_arg: &str) -> Result<()> {
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(SourceError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))
        .into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SourceError::ToolNotFound(name.to_string()).into())
        }
        Err(e) => Err(SourceError::ToolNotFound(format!("{}: {}", name, e)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_sources_need_no_tools() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "text").unwrap();

        assert!(check_sources(&[notes.display().to_string()]).is_ok());
        assert!(check_sources(&[]).is_ok());
    }

    #[test]
    fn test_local_providers_need_no_key() {
        assert!(check_providers(&Settings::default()).is_ok());
    }
}
