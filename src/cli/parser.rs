//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::client::DEFAULT_BASE_URL;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ragflow: client for a retrieval-augmented generation workflow.
///
/// Splits source texts into chunks on a remote service, then answers
/// prompts against them.
#[derive(Parser, Debug)]
#[command(name = "ragflow")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of the RAG services.
    #[arg(long, env = "RAGFLOW_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Path to the client state database.
    ///
    /// Defaults to `.ragflow/state.db` in the current directory.
    #[arg(short, long, env = "RAGFLOW_STATE_PATH", global = true)]
    pub state_path: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the session status.
    Status,

    /// Delete the session's remote state and start a new session.
    Reset {
        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show or replace a source text.
    Text {
        /// Source text slot (1 or 2).
        slot: String,

        /// New content.
        content: Option<String>,

        /// Read the new content from a file.
        #[arg(short, long, conflicts_with = "content")]
        file: Option<PathBuf>,

        /// Read the new content from stdin.
        #[arg(long, conflicts_with_all = ["content", "file"])]
        stdin: bool,
    },

    /// Get or set a setting.
    Set {
        /// Setting name (e.g. `chunks`, `method`, `maxTokensPerLine`).
        key: String,

        /// Value to set (omit to get current value).
        value: Option<String>,
    },

    /// Show all settings.
    Settings,

    /// Split both source texts into chunks.
    Split {
        /// Show chunk previews.
        #[arg(short, long)]
        preview: bool,
    },

    /// Load a document into the first source text.
    Load {
        /// Document URL (defaults to the `url` setting).
        url: Option<String>,
    },

    /// Show or replace the prompt.
    Prompt {
        /// New prompt text.
        text: Option<String>,
    },

    /// Run the prompt against the session's chunks.
    Query {
        /// Prompt text (defaults to the stored prompt).
        prompt: Option<String>,
    },

    /// Start an interactive session.
    ///
    /// Chunks stay in memory across shell commands, so context can be
    /// assembled from the latest split.
    Shell,
}

impl Cli {
    /// Returns the state database path, using the default if not specified.
    #[must_use]
    pub fn get_state_path(&self) -> PathBuf {
        self.state_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::storage::DEFAULT_STATE_PATH))
    }
}
