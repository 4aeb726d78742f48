//! Line-oriented interactive front end for the [`Workbench`].
//!
//! Each line is one action, mirroring the buttons of a picture-prompt UI:
//! type a prompt, generate, toggle selection mode, mark images, download.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::controller::{DownloadOutcome, Workbench};
use crate::generation::GenerateOutcome;
use crate::selection::ToggleOutcome;

pub const HELP: &str = "\
Commands:
  prompt <text>   Set the prompt
  generate        Generate images for the prompt
  refresh         Generate again with the same prompt
  list            Show current results
  select          Toggle selection mode
  toggle <n>...   Mark or unmark result positions
  download        Save the selection (one image, or images.zip)
  first           Save the first result
  status          Show prompt, status and selection
  help            Show this help
  quit            Leave";

/// A parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Prompt(String),
    Generate,
    Refresh,
    List,
    Select,
    Toggle(Vec<usize>),
    Download,
    First,
    Status,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "prompt" | "p" => ShellCommand::Prompt(rest.to_string()),
        "generate" | "gen" | "g" => ShellCommand::Generate,
        "refresh" | "r" => ShellCommand::Refresh,
        "list" | "ls" | "l" => ShellCommand::List,
        "select" | "s" => ShellCommand::Select,
        "toggle" | "t" => {
            let indices = rest
                .split([',', ' '])
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<usize>().map_err(|_| format!("Not a position: '{}'", s)))
                .collect::<Result<Vec<_>, _>>()?;
            if indices.is_empty() {
                return Err("toggle needs at least one position".to_string());
            }
            ShellCommand::Toggle(indices)
        }
        "download" | "d" => ShellCommand::Download,
        "first" | "f" => ShellCommand::First,
        "status" => ShellCommand::Status,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("Unknown command '{}'. Type 'help'.", other)),
    };
    Ok(Some(command))
}

/// Read commands from `input` until EOF or `quit`
pub async fn run_shell<R, W>(workbench: &mut Workbench, input: R, out: &mut W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    write!(out, "> ")?;
    out.flush()?;

    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => execute(workbench, command, out).await?,
            Ok(None) => {}
            Err(msg) => writeln!(out, "{}", msg)?,
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

async fn execute<W: Write>(
    workbench: &mut Workbench,
    command: ShellCommand,
    out: &mut W,
) -> std::io::Result<()> {
    match command {
        ShellCommand::Prompt(text) => {
            workbench.set_prompt(text);
            if !workbench.prompt().is_submittable() {
                writeln!(out, "Prompt is empty.")?;
            }
        }
        ShellCommand::Generate => {
            let outcome = workbench.generate().await;
            report_generation(workbench, outcome, out)?;
        }
        ShellCommand::Refresh => {
            let outcome = workbench.refresh().await;
            report_generation(workbench, outcome, out)?;
        }
        ShellCommand::List => print_results(workbench, out)?,
        ShellCommand::Select => {
            let active = workbench.toggle_selection_mode();
            writeln!(out, "Selection mode {}.", if active { "on" } else { "off" })?;
        }
        ShellCommand::Toggle(indices) => {
            for index in indices {
                let verb = match workbench.toggle_item(index) {
                    ToggleOutcome::Added => "selected",
                    ToggleOutcome::Removed => "unselected",
                    ToggleOutcome::Ignored if !workbench.selection().is_active() => {
                        "ignored (selection mode is off)"
                    }
                    ToggleOutcome::Ignored => "ignored (no such result)",
                };
                writeln!(out, "  [{}] {}", index, verb)?;
            }
        }
        ShellCommand::Download => report_download(workbench.download_selected().await, out)?,
        ShellCommand::First => report_download(workbench.download_first().await, out)?,
        ShellCommand::Status => {
            let snap = workbench.snapshot();
            writeln!(out, "Prompt:    {}", snap.prompt)?;
            writeln!(out, "Status:    {}", snap.status)?;
            writeln!(out, "Results:   {}", snap.results.len())?;
            writeln!(
                out,
                "Selection: {} {:?}",
                if snap.selection.active { "on" } else { "off" },
                snap.selection.order
            )?;
            if let Some(msg) = workbench.last_failure() {
                writeln!(out, "Last error: {}", msg)?;
            }
        }
        ShellCommand::Help => writeln!(out, "{}", HELP)?,
        ShellCommand::Quit => {}
    }
    Ok(())
}

fn print_results<W: Write>(workbench: &Workbench, out: &mut W) -> std::io::Result<()> {
    let results = workbench.results();
    if results.is_empty() {
        return writeln!(out, "No results.");
    }
    for (index, item) in results.iter().enumerate() {
        let mark = if workbench.selection().contains(index) { "*" } else { " " };
        writeln!(out, "{} [{}] {}", mark, index, item.description)?;
        writeln!(out, "      {}", item.url)?;
    }
    Ok(())
}

fn report_generation<W: Write>(
    workbench: &Workbench,
    outcome: GenerateOutcome,
    out: &mut W,
) -> std::io::Result<()> {
    match outcome {
        GenerateOutcome::Published { .. } => print_results(workbench, out),
        GenerateOutcome::Ignored => writeln!(out, "Type a prompt first."),
        GenerateOutcome::Busy => writeln!(out, "Still generating."),
        GenerateOutcome::Failed(e) => writeln!(out, "Generation failed: {}", e),
    }
}

fn report_download<W: Write>(outcome: DownloadOutcome, out: &mut W) -> std::io::Result<()> {
    match outcome {
        DownloadOutcome::Saved(artifact) => {
            writeln!(out, "Saved {}", artifact.path.display())?;
            for entry in &artifact.entries {
                writeln!(out, "  {} <- {}", entry.name, entry.url)?;
            }
        }
        DownloadOutcome::Nothing => writeln!(out, "Nothing to download.")?,
        DownloadOutcome::Failed(e) => writeln!(out, "Download failed: {}", e)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_command("generate"), Ok(Some(ShellCommand::Generate)));
        assert_eq!(parse_command("  Q "), Ok(Some(ShellCommand::Quit)));
        assert_eq!(parse_command(""), Ok(None));
    }

    #[test]
    fn test_parse_prompt_keeps_text() {
        assert_eq!(
            parse_command("prompt misty  mountain lake"),
            Ok(Some(ShellCommand::Prompt("misty  mountain lake".to_string())))
        );
        assert_eq!(parse_command("prompt"), Ok(Some(ShellCommand::Prompt(String::new()))));
    }

    #[test]
    fn test_parse_toggle_positions() {
        assert_eq!(parse_command("toggle 2 0"), Ok(Some(ShellCommand::Toggle(vec![2, 0]))));
        assert_eq!(parse_command("t 1,3"), Ok(Some(ShellCommand::Toggle(vec![1, 3]))));
        assert!(parse_command("toggle").is_err());
        assert!(parse_command("toggle x").is_err());
    }

    #[test]
    fn test_parse_unknown() {
        assert!(parse_command("paint").unwrap_err().contains("paint"));
    }
}
