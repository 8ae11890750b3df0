//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::{MemoryChunk, Settings, TokenCounts};
use crate::error::Error;
use crate::workflow::{Outcome, StatusSnapshot};
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Formats a status response.
#[must_use]
pub fn format_status(status: &StatusSnapshot, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_status_text(status),
        OutputFormat::Json => format_json(status),
    }
}

fn format_status_text(status: &StatusSnapshot) -> String {
    let mut output = String::new();
    output.push_str("ragflow Status\n");
    output.push_str("==============\n\n");
    let _ = writeln!(output, "  Session:       {}", status.session_id);
    let _ = writeln!(output, "  Phase:         {}", status.phase);
    let _ = writeln!(
        output,
        "  Busy:          {}",
        if status.busy { "yes" } else { "no" }
    );
    let _ = writeln!(output, "  Submit:        {}", status.submit_label);
    let _ = writeln!(output, "  Method:        {}", status.method);
    let _ = writeln!(
        output,
        "  Chunks:        {} ({} tokens)",
        status.all_chunks.count, status.all_chunks.tokens
    );
    let _ = writeln!(
        output,
        "  Used chunks:   {} ({} tokens)",
        status.used_chunks.count, status.used_chunks.tokens
    );
    output.push('\n');
    output.push_str(&format_counts_text(&status.counts));
    output
}

/// Formats token counts.
#[must_use]
pub fn format_counts(counts: &TokenCounts, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_counts_text(counts),
        OutputFormat::Json => format_json(counts),
    }
}

fn format_counts_text(counts: &TokenCounts) -> String {
    let mut output = String::new();
    output.push_str("Tokens:\n");
    let _ = writeln!(output, "  text1:       {}", counts.text1);
    let _ = writeln!(output, "  text2:       {}", counts.text2);
    let _ = writeln!(output, "  prompt:      {}", counts.prompt);
    let _ = writeln!(output, "  context:     {}", counts.context);
    let _ = writeln!(output, "  completion:  {}", counts.completion);
    output
}

/// Formats all settings.
#[must_use]
pub fn format_settings(settings: &Settings, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            output.push_str("Settings:\n");
            for field in Settings::FIELDS {
                let value = settings.get(field).unwrap_or_default();
                let _ = writeln!(output, "  {field:<22} {}", truncate(&value, 50));
            }
            output
        }
        OutputFormat::Json => format_json(settings),
    }
}

/// Formats a single named value, such as a setting or a buffer.
#[must_use]
pub fn format_value(name: &str, value: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if value.is_empty() {
                format!("{name}: (empty)\n")
            } else {
                format!("{value}\n")
            }
        }
        OutputFormat::Json => format_json(&serde_json::json!({ "name": name, "value": value })),
    }
}

/// Formats a list of chunks.
#[must_use]
pub fn format_chunks(chunks: &[MemoryChunk], preview: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_chunks_text(chunks, preview),
        OutputFormat::Json => format_json(&chunks),
    }
}

fn format_chunks_text(chunks: &[MemoryChunk], preview: bool) -> String {
    if chunks.is_empty() {
        return "No chunks.\n".to_string();
    }

    let mut output = String::new();
    let _ = writeln!(output, "{:<12} {:<8} Text", "Chunk", "Tokens");
    output.push_str(&"-".repeat(70));
    output.push('\n');
    for chunk in chunks {
        let text = if preview {
            chunk.preview(48).replace('\n', " ")
        } else {
            String::new()
        };
        let _ = writeln!(
            output,
            "{:<12} {:<8} {}",
            truncate(&chunk.chunk_id, 12),
            chunk.token_count,
            text
        );
    }
    output
}

/// Query result body.
#[derive(Debug, Serialize)]
struct QueryResult<'a> {
    context: &'a str,
    completion: &'a str,
    memories: &'a [MemoryChunk],
}

/// Formats the result of a query.
#[must_use]
pub fn format_query_result(
    context: &str,
    completion: &str,
    used: &[MemoryChunk],
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "{completion}");
            let _ = writeln!(
                output,
                "\n[{} chunk(s) used, {} context bytes]",
                used.len(),
                context.len()
            );
            output
        }
        OutputFormat::Json => format_json(&QueryResult {
            context,
            completion,
            memories: used,
        }),
    }
}

/// Formats the result of a remote operation.
#[must_use]
pub fn format_outcome(operation: &str, outcome: &Outcome, format: OutputFormat) -> String {
    let (status, error) = match outcome {
        Outcome::Completed => ("completed", None),
        Outcome::Skipped => ("skipped", None),
        Outcome::Failed(e) => ("failed", Some(e.to_string())),
    };
    match format {
        OutputFormat::Text => match error {
            Some(e) => format!("{operation} failed: {e}\n"),
            None if outcome.is_skipped() => {
                format!("{operation} skipped: another operation is in flight\n")
            }
            None => format!("{operation} {status}\n"),
        },
        OutputFormat::Json => format_json(&serde_json::json!({
            "operation": operation,
            "status": status,
            "error": error,
        })),
    }
}

/// Formats an error for output.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => format_json(&serde_json::json!({
            "error": error.to_string(),
        })),
    }
}

/// Formats a value as JSON.
pub(crate) fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Truncates a string to `max_len` characters with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let mut out: String = s.chars().take(max_len - 3).collect();
        out.push_str("...");
        out
    }
}
