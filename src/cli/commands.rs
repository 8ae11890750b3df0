//! CLI command implementations.
//!
//! Each command runs against a [`WorkflowController`]; one-shot commands
//! build one from the CLI options, the shell keeps one alive.

use crate::cli::output::{
    OutputFormat, format_chunks, format_json, format_outcome, format_query_result,
    format_settings, format_status, format_value,
};
use crate::cli::parser::{Cli, Commands};
use crate::cli::shell;
use crate::client::{HttpRagService, RagService, ServiceConfig};
use crate::core::{BufferSlot, Settings};
use crate::error::{CommandError, IoError, Result};
use crate::storage::SqliteStateStore;
use crate::tokens::create_counter;
use crate::workflow::{Outcome, WorkflowController};
use std::io::{self, Read};
use std::path::Path;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let controller = open_controller(cli)?;

    match &cli.command {
        Commands::Shell => {
            shell::run(
                &controller,
                format,
                tokio::io::BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
            )
            .await?;
            Ok(String::new())
        }
        command => run_command(&controller, command, format).await,
    }
}

/// Builds a controller backed by the HTTP services and the state database
/// named on the command line.
///
/// # Errors
///
/// Returns an error if the state database cannot be opened.
pub fn open_controller(cli: &Cli) -> Result<WorkflowController<HttpRagService>> {
    let store = SqliteStateStore::open(cli.get_state_path())?;
    let service = HttpRagService::new(ServiceConfig::with_base_url(cli.base_url.clone()));
    WorkflowController::new(service, create_counter(), Box::new(store))
}

/// Runs a one-shot command against `controller`.
///
/// # Errors
///
/// Returns an error if the command itself fails. A failed remote operation
/// is reported in the output instead.
pub async fn run_command<S: RagService>(
    controller: &WorkflowController<S>,
    command: &Commands,
    format: OutputFormat,
) -> Result<String> {
    match command {
        Commands::Status => Ok(cmd_status(controller, format)),
        Commands::Reset { yes } => {
            if !yes {
                return Err(CommandError::ExecutionFailed(
                    "Use --yes to confirm reset. This will discard the session.".to_string(),
                )
                .into());
            }
            Ok(cmd_reset(controller, format).await)
        }
        Commands::Text {
            slot,
            content,
            file,
            stdin,
        } => {
            let slot: BufferSlot = slot.parse()?;
            let content = match (content, file, stdin) {
                (Some(c), _, _) => Some(c.clone()),
                (None, Some(path), _) => Some(read_source(path)?),
                (None, None, true) => Some(read_stdin()?),
                (None, None, false) => None,
            };
            Ok(cmd_text(controller, slot, content, format))
        }
        Commands::Set { key, value } => cmd_set(controller, key, value.as_deref(), format),
        Commands::Settings => Ok(cmd_settings(controller, format)),
        Commands::Split { preview } => cmd_split(controller, *preview, format).await,
        Commands::Load { url } => cmd_load(controller, url.as_deref(), format).await,
        Commands::Prompt { text } => Ok(cmd_prompt(controller, text.as_deref(), format)),
        Commands::Query { prompt } => cmd_query(controller, prompt.as_deref(), format).await,
        Commands::Shell => Err(CommandError::ExecutionFailed(
            "the shell cannot be started from inside a command".to_string(),
        )
        .into()),
    }
}

pub(crate) fn cmd_status<S: RagService>(
    controller: &WorkflowController<S>,
    format: OutputFormat,
) -> String {
    format_status(&controller.status(), format)
}

pub(crate) async fn cmd_reset<S: RagService>(
    controller: &WorkflowController<S>,
    format: OutputFormat,
) -> String {
    let session = controller.reset().await;
    match format {
        OutputFormat::Text => format!("Session reset. New session: {session}\n"),
        OutputFormat::Json => format_json(&serde_json::json!({ "session_id": session })),
    }
}

/// Shows a source text, or replaces it when `content` is given.
pub(crate) fn cmd_text<S: RagService>(
    controller: &WorkflowController<S>,
    slot: BufferSlot,
    content: Option<String>,
    format: OutputFormat,
) -> String {
    let Some(content) = content else {
        let buffers = controller.buffers();
        return format_value(slot.storage_key(), buffers.source(slot), format);
    };

    let bytes = content.len();
    controller.edit_text(slot, content);
    let counts = controller.counts();
    let tokens = match slot {
        BufferSlot::First => counts.text1,
        BufferSlot::Second => counts.text2,
    };
    match format {
        OutputFormat::Text => format!("Updated {slot} ({bytes} bytes, {tokens} tokens)\n"),
        OutputFormat::Json => format_json(&serde_json::json!({
            "slot": slot.storage_key(),
            "size": bytes,
            "tokens": tokens,
        })),
    }
}

pub(crate) fn cmd_set<S: RagService>(
    controller: &WorkflowController<S>,
    key: &str,
    value: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    if let Some(value) = value {
        controller.set_setting(key, value)?;
    }
    let current = controller.settings().get(key).ok_or_else(|| {
        CommandError::InvalidArgument(format!(
            "unknown setting: {key} (expected one of: {})",
            Settings::FIELDS.join(", ")
        ))
    })?;
    Ok(format_value(key, &current, format))
}

pub(crate) fn cmd_settings<S: RagService>(
    controller: &WorkflowController<S>,
    format: OutputFormat,
) -> String {
    format_settings(&controller.settings(), format)
}

pub(crate) async fn cmd_split<S: RagService>(
    controller: &WorkflowController<S>,
    preview: bool,
    format: OutputFormat,
) -> Result<String> {
    match controller.split().await {
        Outcome::Completed => Ok(format_chunks(controller.chunks().all(), preview, format)),
        outcome => Ok(report("split", &outcome, format)),
    }
}

/// Loads both source texts from files and splits them.
pub(crate) async fn cmd_samples<S: RagService>(
    controller: &WorkflowController<S>,
    first: &Path,
    second: Option<&Path>,
    format: OutputFormat,
) -> Result<String> {
    let text1 = read_source(first)?;
    let text2 = second.map(read_source).transpose()?.unwrap_or_default();
    match controller.load_and_split(text1, text2).await {
        Outcome::Completed => Ok(format_chunks(controller.chunks().all(), false, format)),
        outcome => Ok(report("split", &outcome, format)),
    }
}

pub(crate) async fn cmd_load<S: RagService>(
    controller: &WorkflowController<S>,
    url: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    if let Some(url) = url {
        controller.update_settings(|settings| settings.url = url.to_string());
    }
    match controller.load_document().await {
        Outcome::Completed => {
            let size = controller.buffers().text1.len();
            let tokens = controller.counts().text1;
            Ok(match format {
                OutputFormat::Text => {
                    format!("Loaded {size} bytes into text1 ({tokens} tokens)\n")
                }
                OutputFormat::Json => format_json(&serde_json::json!({
                    "slot": BufferSlot::First.storage_key(),
                    "size": size,
                    "tokens": tokens,
                })),
            })
        }
        outcome => Ok(report("load", &outcome, format)),
    }
}

/// Shows the prompt, or replaces it when `text` is given.
pub(crate) fn cmd_prompt<S: RagService>(
    controller: &WorkflowController<S>,
    text: Option<&str>,
    format: OutputFormat,
) -> String {
    if let Some(text) = text {
        controller.edit_prompt(text);
    }
    format_value("prompt", &controller.settings().prompt, format)
}

pub(crate) async fn cmd_query<S: RagService>(
    controller: &WorkflowController<S>,
    prompt: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    if let Some(prompt) = prompt {
        controller.edit_prompt(prompt);
    }
    match controller.query().await {
        Outcome::Completed => {
            let buffers = controller.buffers();
            let chunks = controller.chunks();
            Ok(format_query_result(
                &buffers.context,
                &buffers.completion,
                chunks.used(),
                format,
            ))
        }
        outcome => Ok(report("query", &outcome, format)),
    }
}

/// Reports a skipped or failed remote operation. The failure is already
/// logged by the controller and is not a command error.
fn report(operation: &str, outcome: &Outcome, format: OutputFormat) -> String {
    format_outcome(operation, outcome, format)
}

/// Reads a source text from a file.
pub(crate) fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            IoError::ReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        }
        .into()
    })
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| CommandError::ExecutionFailed(format!("Failed to read from stdin: {e}")))?;
    Ok(buffer)
}
