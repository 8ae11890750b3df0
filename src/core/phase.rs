//! Workflow phase and submit label.

use crate::error::{CommandError, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which buffer is conceptually active.
///
/// Successful operations move the cursor (`chunk -> prompt -> completion`),
/// but every phase stays reachable by direct navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Editing source texts and split settings.
    #[default]
    Chunk,
    /// Editing the prompt and query settings.
    Prompt,
    /// Viewing the context buffer.
    Context,
    /// Viewing the completion.
    Completion,
}

impl Phase {
    /// Returns the phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chunk => "chunk",
            Self::Prompt => "prompt",
            Self::Context => "context",
            Self::Completion => "completion",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chunk" | "text" => Ok(Self::Chunk),
            "prompt" => Ok(Self::Prompt),
            "context" => Ok(Self::Context),
            "completion" => Ok(Self::Completion),
            _ => Err(CommandError::InvalidArgument(format!("unknown phase: {s}")).into()),
        }
    }
}

/// Label shown on the query action.
///
/// Purely observational: it never gates an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmitLabel {
    /// No query has run yet.
    #[default]
    Process,
    /// A query is in flight.
    Busy,
    /// A query has finished.
    Submit,
}

impl SubmitLabel {
    /// Returns the label text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Process => "Process",
            Self::Busy => "Busy...",
            Self::Submit => "Submit",
        }
    }
}

impl fmt::Display for SubmitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
