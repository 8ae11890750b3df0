//! tiktoken-based token counter.
//!
//! Counts `cl100k_base` BPE tokens via tiktoken-rs.

use crate::Result;
use crate::error::Error;
use crate::tokens::TokenCounter;
use std::sync::OnceLock;
use tiktoken_rs::CoreBPE;

/// Shared BPE tables, built once on first use.
static CL100K: OnceLock<CoreBPE> = OnceLock::new();

/// Token counter using the `cl100k_base` encoding.
///
/// Text is encoded as ordinary text: special-token markers such as
/// `<|endoftext|>` are counted like any other characters, so counting never
/// fails.
///
/// # Examples
///
/// ```
/// use ragflow::tokens::{TiktokenCounter, TokenCounter};
///
/// let counter = TiktokenCounter::new().unwrap();
/// assert_eq!(counter.count(""), 0);
/// assert_eq!(counter.count("hello"), 1);
/// ```
pub struct TiktokenCounter {
    bpe: &'static CoreBPE,
}

impl TiktokenCounter {
    /// Creates a counter, building the BPE tables if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoding tables cannot be built.
    pub fn new() -> Result<Self> {
        if let Some(bpe) = CL100K.get() {
            return Ok(Self { bpe });
        }

        let bpe = tiktoken_rs::cl100k_base().map_err(|e| Error::Config {
            message: format!("failed to load cl100k_base: {e}"),
        })?;

        // Store the tables, ignoring if another thread beat us to it
        let _ = CL100K.set(bpe);

        CL100K
            .get()
            .map(|bpe| Self { bpe })
            .ok_or_else(|| Error::InvalidState {
                message: "tokenizer initialization race".to_string(),
            })
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_ordinary(text).len()
    }

    fn name(&self) -> &'static str {
        "cl100k_base"
    }
}
