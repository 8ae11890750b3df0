//! Character-based token estimate.

use crate::tokens::TokenCounter;

/// Estimates tokens as roughly four bytes per token.
///
/// Used when the tiktoken tables cannot be built. Not exact, but total,
/// deterministic and zero for empty text.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimateCounter;

impl TokenCounter for EstimateCounter {
    fn count(&self, text: &str) -> usize {
        // Common approximation: ~4 chars per token
        text.len().div_ceil(4)
    }

    fn name(&self) -> &'static str {
        "estimate"
    }
}
