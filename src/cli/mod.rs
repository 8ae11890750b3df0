//! CLI layer for ragflow.
//!
//! Provides the command-line interface using clap, with one-shot commands
//! for inspecting and driving a session and an interactive shell.

pub mod commands;
pub mod output;
pub mod parser;
pub mod shell;

pub use commands::{execute, open_controller, run_command};
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
