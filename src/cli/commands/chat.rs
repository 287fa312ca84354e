//! Interactive chat command.
//!
//! A read-eval loop over the orchestrator: lines starting with a command word
//! manage sources, anything else is a question.

use super::{load_sources, report_error};
use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// A parsed line of chat input.
#[derive(Debug, PartialEq, Eq)]
enum ChatCommand<'a> {
    Add(&'a str),
    Remove(&'a str),
    Sources,
    Clear,
    Help,
    Exit,
    Ask(&'a str),
    Empty,
}

impl<'a> ChatCommand<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => ChatCommand::Empty,
            "exit" | "quit" if rest.is_empty() => ChatCommand::Exit,
            "sources" if rest.is_empty() => ChatCommand::Sources,
            "clear" if rest.is_empty() => ChatCommand::Clear,
            "help" if rest.is_empty() => ChatCommand::Help,
            "add" if !rest.is_empty() => ChatCommand::Add(rest),
            "remove" if !rest.is_empty() => ChatCommand::Remove(rest),
            _ => ChatCommand::Ask(line),
        }
    }
}

/// Run the interactive chat command.
pub async fn run_chat(
    sources: &[String],
    model: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(model) = model {
        settings.generation.model = model;
    }

    if let Err(e) = preflight::check_providers(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lecturmate doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    if !sources.is_empty() {
        preflight::check_sources(sources)?;
        load_sources(&orchestrator, sources).await?;
    }

    println!("\n{}", style("LecturMate Chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask a question, or type 'help' for commands and 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        match ChatCommand::parse(&input) {
            ChatCommand::Empty => continue,
            ChatCommand::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ChatCommand::Help => print_help(),
            ChatCommand::Sources => {
                let sources = orchestrator.sources().await;
                if sources.is_empty() {
                    Output::info("No sources loaded. Use 'add <file or YouTube URL>'.");
                } else {
                    Output::header("Sources");
                    for source in &sources {
                        Output::source_info(source);
                    }
                    Output::kv("Chunks", &orchestrator.chunk_count().to_string());
                }
            }
            ChatCommand::Add(input) => {
                let input = input.to_string();
                if let Err(e) = preflight::check_sources(std::slice::from_ref(&input)) {
                    Output::error(&e.to_string());
                    continue;
                }
                // Errors were already reported by load_sources
                let _ = load_sources(&orchestrator, std::slice::from_ref(&input)).await;
            }
            ChatCommand::Remove(id) => match orchestrator.remove_source(id).await {
                Ok(removed) => Output::success(&format!("Removed {}", removed.name)),
                Err(e) => report_error(&e),
            },
            ChatCommand::Clear => {
                let removed = orchestrator.clear_sources().await;
                Output::info(&format!("Removed {} source(s).", removed));
            }
            ChatCommand::Ask(question) => {
                let spinner = Output::spinner("Thinking...");
                let response = orchestrator.ask(question).await;
                spinner.finish_and_clear();

                match response {
                    Ok(response) => {
                        println!("\n{} {}\n", style("LecturMate:").cyan().bold(), response.answer);
                        for source in &response.sources {
                            println!(
                                "  {} {} (chunk {}, score: {:.2})",
                                style("-").dim(),
                                source.source_label(),
                                source.chunk_index,
                                source.score
                            );
                        }
                        if !response.sources.is_empty() {
                            println!();
                        }
                    }
                    Err(e) => report_error(&e),
                }
            }
        }
    }

    Ok(())
}

fn print_help() {
    Output::header("Commands");
    Output::kv("add <source>", "load a text/Markdown file, PDF or YouTube video");
    Output::kv("remove <id>", "unload a source by id or name");
    Output::kv("sources", "list loaded sources");
    Output::kv("clear", "unload every source");
    Output::kv("exit", "leave the chat");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ChatCommand::parse("  "), ChatCommand::Empty);
        assert_eq!(ChatCommand::parse("EXIT\n"), ChatCommand::Exit);
        assert_eq!(ChatCommand::parse("sources"), ChatCommand::Sources);
        assert_eq!(ChatCommand::parse("add notes.md"), ChatCommand::Add("notes.md"));
        assert_eq!(
            ChatCommand::parse("remove  lecture 1.txt"),
            ChatCommand::Remove("lecture 1.txt")
        );
    }

    #[test]
    fn test_command_words_inside_questions_are_questions() {
        assert_eq!(
            ChatCommand::parse("clear the confusion about entropy?"),
            ChatCommand::Ask("clear the confusion about entropy?")
        );
        assert_eq!(ChatCommand::parse("add"), ChatCommand::Ask("add"));
    }
}
