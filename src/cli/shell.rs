//! Interactive shell.
//!
//! Runs line-oriented commands against one long-lived controller, so the
//! chunk store, context and completion survive between commands.

use crate::cli::commands::{
    cmd_load, cmd_prompt, cmd_query, cmd_reset, cmd_samples, cmd_set, cmd_settings, cmd_split,
    cmd_status, cmd_text,
};
use crate::cli::output::{
    OutputFormat, format_chunks, format_counts, format_error, format_value,
};
use crate::client::RagService;
use crate::core::{BufferSlot, Phase};
use crate::error::{CommandError, Result};
use crate::workflow::WorkflowController;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Prompt printed before each line.
pub const SHELL_PROMPT: &str = "ragflow> ";

const HELP: &str = "\
Commands:
  status                     show the session status
  text1 [content]            show or replace the first source text
  text2 [content]            show or replace the second source text
  samples <file1> [file2]    load both source texts from files and split
  set <key> [value]          get or set a setting
  settings                   show all settings
  split                      split the source texts into chunks
  load [url]                 load a document into text1
  context                    fill the context from the first chunks
  edit-context <text>        replace the context
  prompt [text]              show or replace the prompt
  sample-prompt <text>       replace the prompt and refresh all counts
  query [prompt]             run the prompt against the session's chunks
  phase [name]               show or move the buffer cursor
  chunks [used]              list all chunks, or the ones the last query used
  show <buffer>              print text1, text2, prompt, context or completion
  counts                     recompute and show token counts
  reset                      start a new session
  help                       show this help
  quit                       leave the shell
";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Blank line.
    Empty,
    /// Show the session status.
    Status,
    /// Show or replace a source text.
    Text {
        /// Target slot.
        slot: BufferSlot,
        /// Replacement content.
        content: Option<String>,
    },
    /// Load source texts from files and split.
    Samples {
        /// File for the first source text.
        first: PathBuf,
        /// File for the second source text.
        second: Option<PathBuf>,
    },
    /// Get or set a setting.
    Set {
        /// Setting name.
        key: String,
        /// New value.
        value: Option<String>,
    },
    /// Show all settings.
    Settings,
    /// Split the source texts.
    Split,
    /// Load a document.
    Load {
        /// Document URL.
        url: Option<String>,
    },
    /// Assemble the context from stored chunks.
    Context,
    /// Replace the context.
    EditContext(String),
    /// Show or replace the prompt.
    Prompt(Option<String>),
    /// Replace the prompt with a sample.
    SamplePrompt(String),
    /// Run a query.
    Query(Option<String>),
    /// Show or move the buffer cursor.
    Phase(Option<Phase>),
    /// List chunks.
    Chunks {
        /// List the used subset instead of all chunks.
        used: bool,
    },
    /// Print one buffer.
    Show(String),
    /// Recompute token counts.
    Counts,
    /// Start a new session.
    Reset,
    /// Show help.
    Help,
    /// Leave the shell.
    Quit,
}

/// Buffers `show` can print.
const SHOWABLE: [&str; 5] = ["text1", "text2", "prompt", "context", "completion"];

/// Parses one shell line.
///
/// # Errors
///
/// Returns an error for an unknown verb or a missing argument.
///
/// # Examples
///
/// ```
/// use ragflow::cli::shell::{ShellCommand, parse_shell_line};
///
/// assert_eq!(parse_shell_line("  split ").unwrap(), ShellCommand::Split);
/// assert_eq!(
///     parse_shell_line("set chunks 5").unwrap(),
///     ShellCommand::Set { key: "chunks".to_string(), value: Some("5".to_string()) }
/// );
/// ```
pub fn parse_shell_line(line: &str) -> Result<ShellCommand> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    let command = match verb {
        "" => ShellCommand::Empty,
        "status" => ShellCommand::Status,
        "text1" | "text2" => ShellCommand::Text {
            slot: verb.parse()?,
            content: arg,
        },
        "samples" => {
            let mut paths = rest.split_whitespace().map(PathBuf::from);
            let first = paths.next().ok_or_else(|| {
                CommandError::MissingArgument("samples <file1> [file2]".to_string())
            })?;
            ShellCommand::Samples {
                first,
                second: paths.next(),
            }
        }
        "set" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("set <key> [value]".to_string()).into());
            }
            let (key, value) = rest
                .split_once(char::is_whitespace)
                .map_or((rest, None), |(key, value)| (key, Some(value.trim().to_string())));
            ShellCommand::Set {
                key: key.to_string(),
                value,
            }
        }
        "settings" => ShellCommand::Settings,
        "split" => ShellCommand::Split,
        "load" => ShellCommand::Load { url: arg },
        "context" => ShellCommand::Context,
        "edit-context" => ShellCommand::EditContext(rest.to_string()),
        "prompt" => ShellCommand::Prompt(arg),
        "sample-prompt" => ShellCommand::SamplePrompt(
            arg.ok_or_else(|| CommandError::MissingArgument("sample-prompt <text>".to_string()))?,
        ),
        "query" => ShellCommand::Query(arg),
        "phase" => ShellCommand::Phase(arg.map(|p| p.parse::<Phase>()).transpose()?),
        "chunks" => match rest {
            "" => ShellCommand::Chunks { used: false },
            "used" => ShellCommand::Chunks { used: true },
            other => {
                return Err(CommandError::InvalidArgument(format!(
                    "chunks takes no argument or 'used', got: {other}"
                ))
                .into());
            }
        },
        "show" => {
            if !SHOWABLE.contains(&rest) {
                return Err(CommandError::InvalidArgument(format!(
                    "show expects one of: {}",
                    SHOWABLE.join(", ")
                ))
                .into());
            }
            ShellCommand::Show(rest.to_string())
        }
        "counts" => ShellCommand::Counts,
        "reset" => ShellCommand::Reset,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(CommandError::UnknownCommand(other.to_string()).into()),
    };
    Ok(command)
}

/// Runs the shell until `quit` or end of input.
///
/// Command failures are printed and the shell keeps going.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub async fn run<S, R, W>(
    controller: &WorkflowController<S>,
    format: OutputFormat,
    input: R,
    mut output: W,
) -> Result<()>
where
    S: RagService,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        output.write_all(SHELL_PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        debug!(line = %line, "shell input");

        let reply = match parse_shell_line(&line) {
            Ok(ShellCommand::Quit) => break,
            Ok(command) => dispatch(controller, command, format).await,
            Err(e) => Err(e),
        };
        let text = match reply {
            Ok(text) => text,
            Err(e) => format!("Error: {}\n", format_error(&e, format)),
        };
        output.write_all(text.as_bytes()).await?;
    }
    output.flush().await?;
    Ok(())
}

/// Executes one parsed shell command.
///
/// # Errors
///
/// Returns an error if the command fails.
pub async fn dispatch<S: RagService>(
    controller: &WorkflowController<S>,
    command: ShellCommand,
    format: OutputFormat,
) -> Result<String> {
    match command {
        ShellCommand::Empty | ShellCommand::Quit => Ok(String::new()),
        ShellCommand::Status => Ok(cmd_status(controller, format)),
        ShellCommand::Text { slot, content } => Ok(cmd_text(controller, slot, content, format)),
        ShellCommand::Samples { first, second } => {
            cmd_samples(controller, &first, second.as_deref(), format).await
        }
        ShellCommand::Set { key, value } => cmd_set(controller, &key, value.as_deref(), format),
        ShellCommand::Settings => Ok(cmd_settings(controller, format)),
        ShellCommand::Split => cmd_split(controller, true, format).await,
        ShellCommand::Load { url } => cmd_load(controller, url.as_deref(), format).await,
        ShellCommand::Context => {
            if controller.load_context() {
                Ok(format_value("context", &controller.buffers().context, format))
            } else {
                Ok("Context unchanged: no chunks or chunk limit not positive.\n".to_string())
            }
        }
        ShellCommand::EditContext(text) => {
            controller.edit_context(text);
            Ok(format_counts(&controller.counts(), format))
        }
        ShellCommand::Prompt(text) => Ok(cmd_prompt(controller, text.as_deref(), format)),
        ShellCommand::SamplePrompt(text) => {
            controller.load_sample_prompt(text);
            Ok(format_counts(&controller.counts(), format))
        }
        ShellCommand::Query(prompt) => cmd_query(controller, prompt.as_deref(), format).await,
        ShellCommand::Phase(phase) => {
            if let Some(phase) = phase {
                controller.set_phase(phase);
            }
            Ok(format_value("phase", controller.phase().as_str(), format))
        }
        ShellCommand::Chunks { used } => {
            let chunks = controller.chunks();
            let list = if used { chunks.used() } else { chunks.all() };
            Ok(format_chunks(list, true, format))
        }
        ShellCommand::Show(name) => {
            let state = controller.snapshot_state();
            let value = match name.as_str() {
                "text1" => state.buffers.text1,
                "text2" => state.buffers.text2,
                "prompt" => state.settings.prompt,
                "context" => state.buffers.context,
                _ => state.buffers.completion,
            };
            Ok(format_value(&name, &value, format))
        }
        ShellCommand::Counts => Ok(format_counts(&controller.update_token_counts(), format)),
        ShellCommand::Reset => Ok(cmd_reset(controller, format).await),
        ShellCommand::Help => Ok(HELP.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("status", ShellCommand::Status ; "status")]
    #[test_case("", ShellCommand::Empty ; "blank")]
    #[test_case("   ", ShellCommand::Empty ; "whitespace only")]
    #[test_case("split", ShellCommand::Split ; "split")]
    #[test_case("context", ShellCommand::Context ; "context")]
    #[test_case("exit", ShellCommand::Quit ; "exit alias")]
    #[test_case("?", ShellCommand::Help ; "help alias")]
    #[test_case("chunks used", ShellCommand::Chunks { used: true } ; "used chunks")]
    #[test_case("load", ShellCommand::Load { url: None } ; "load without url")]
    #[test_case("phase prompt", ShellCommand::Phase(Some(Phase::Prompt)) ; "phase")]
    fn test_parse_simple(line: &str, expected: ShellCommand) {
        assert_eq!(parse_shell_line(line).unwrap(), expected);
    }

    #[test]
    fn test_parse_text_keeps_inner_whitespace() {
        assert_eq!(
            parse_shell_line("text2   a b  c ").unwrap(),
            ShellCommand::Text {
                slot: BufferSlot::Second,
                content: Some("a b  c".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_set_value_with_spaces() {
        assert_eq!(
            parse_shell_line("set prompt What is RAG?").unwrap(),
            ShellCommand::Set {
                key: "prompt".to_string(),
                value: Some("What is RAG?".to_string()),
            }
        );
        assert_eq!(
            parse_shell_line("set chunks").unwrap(),
            ShellCommand::Set {
                key: "chunks".to_string(),
                value: None,
            }
        );
    }

    #[test]
    fn test_parse_samples() {
        assert_eq!(
            parse_shell_line("samples a.txt b.txt").unwrap(),
            ShellCommand::Samples {
                first: PathBuf::from("a.txt"),
                second: Some(PathBuf::from("b.txt")),
            }
        );
    }

    #[test_case("frobnicate" ; "unknown verb")]
    #[test_case("set" ; "set without key")]
    #[test_case("samples" ; "samples without files")]
    #[test_case("show nothing" ; "unknown buffer")]
    #[test_case("chunks some" ; "bad chunks argument")]
    #[test_case("phase sideways" ; "unknown phase")]
    #[test_case("sample-prompt" ; "sample prompt without text")]
    fn test_parse_rejects(line: &str) {
        assert!(parse_shell_line(line).is_err());
    }
}
