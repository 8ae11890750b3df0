//! Text buffers and their token accounting.
//!
//! A session works on two editable source texts, a context buffer filled
//! from retrieved chunks and a completion buffer filled by the query
//! service. Token counts are derived values and are recomputed explicitly
//! after every mutation.

use crate::error::{CommandError, Error, Result};
use crate::tokens::TokenCounter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one of the two editable source texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferSlot {
    /// First source text (`file1`).
    First,
    /// Second source text (`file2`).
    Second,
}

impl BufferSlot {
    /// Both slots in request order.
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    /// File name sent to the splitting service for this slot.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::First => "file1",
            Self::Second => "file2",
        }
    }

    /// Key under which the slot's text is persisted.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::First => "text1",
            Self::Second => "text2",
        }
    }
}

impl fmt::Display for BufferSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

impl FromStr for BufferSlot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1" | "text1" | "file1" => Ok(Self::First),
            "2" | "text2" | "file2" => Ok(Self::Second),
            _ => Err(CommandError::InvalidArgument(format!("unknown text buffer: {s}")).into()),
        }
    }
}

/// The session's text buffers.
///
/// # Examples
///
/// ```
/// use ragflow::core::{BufferSlot, TextBuffers};
///
/// let mut buffers = TextBuffers::default();
/// buffers.set_source(BufferSlot::First, "Hello".to_string());
/// assert_eq!(buffers.source(BufferSlot::First), "Hello");
/// assert!(buffers.source(BufferSlot::Second).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBuffers {
    /// First source text.
    pub text1: String,

    /// Second source text.
    pub text2: String,

    /// Context assembled from chunks or returned by the query service.
    pub context: String,

    /// Completion returned by the query service.
    pub completion: String,
}

impl TextBuffers {
    /// Returns the source text in `slot`.
    #[must_use]
    pub fn source(&self, slot: BufferSlot) -> &str {
        match slot {
            BufferSlot::First => &self.text1,
            BufferSlot::Second => &self.text2,
        }
    }

    /// Replaces the source text in `slot`.
    pub fn set_source(&mut self, slot: BufferSlot, text: String) {
        match slot {
            BufferSlot::First => self.text1 = text,
            BufferSlot::Second => self.text2 = text,
        }
    }

    /// Clears all four buffers.
    pub fn clear(&mut self) {
        self.text1.clear();
        self.text2.clear();
        self.context.clear();
        self.completion.clear();
    }

    /// Checks if every buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text1.is_empty()
            && self.text2.is_empty()
            && self.context.is_empty()
            && self.completion.is_empty()
    }
}

/// Token counts displayed for each buffer.
///
/// `prompt` counts the prompt concatenated with the context, since that is
/// what gets submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    /// Tokens in the first source text.
    pub text1: usize,
    /// Tokens in the second source text.
    pub text2: usize,
    /// Tokens in prompt + context.
    pub prompt: usize,
    /// Tokens in the context buffer.
    pub context: usize,
    /// Tokens in the completion buffer.
    pub completion: usize,
}

impl TokenCounts {
    /// Recomputes every count from the current buffers and prompt.
    #[must_use]
    pub fn compute(counter: &dyn TokenCounter, buffers: &TextBuffers, prompt: &str) -> Self {
        Self {
            text1: counter.count(&buffers.text1),
            text2: counter.count(&buffers.text2),
            prompt: prompt_tokens(counter, prompt, &buffers.context),
            context: counter.count(&buffers.context),
            completion: counter.count(&buffers.completion),
        }
    }

    /// Total tokens across both source texts.
    #[must_use]
    pub const fn source_total(&self) -> usize {
        self.text1 + self.text2
    }

    /// Returns true when every count is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.text1 == 0
            && self.text2 == 0
            && self.prompt == 0
            && self.context == 0
            && self.completion == 0
    }
}

/// Token count of the prompt followed directly by the context.
#[must_use]
pub fn prompt_tokens(counter: &dyn TokenCounter, prompt: &str, context: &str) -> usize {
    let mut submitted = String::with_capacity(prompt.len() + context.len());
    submitted.push_str(prompt);
    submitted.push_str(context);
    counter.count(&submitted)
}
