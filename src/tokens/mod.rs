//! Token counting for displayed buffer sizes.
//!
//! Provides BPE token counts using tiktoken (`cl100k_base`) when its tables
//! can be built, or a character-based estimate as a fallback.
//!
//! Every counter is total: any string, including the empty string, maps to
//! a count, and the same input always gives the same count.

mod estimate;
mod tiktoken_impl;

pub use estimate::EstimateCounter;
pub use tiktoken_impl::TiktokenCounter;

/// Trait for token counters.
///
/// Implementations must be thread-safe (`Send + Sync`) so a counter can be
/// shared by the workflow controller across tasks.
///
/// # Examples
///
/// ```
/// use ragflow::tokens::{EstimateCounter, TokenCounter};
///
/// let counter = EstimateCounter;
/// assert_eq!(counter.count(""), 0);
/// assert_eq!(counter.count("abcd"), 1);
/// ```
pub trait TokenCounter: Send + Sync {
    /// Returns the number of tokens in `text`.
    fn count(&self, text: &str) -> usize;

    /// Returns a short name for the tokenization scheme.
    fn name(&self) -> &'static str;
}

/// Creates the default token counter.
///
/// Returns a [`TiktokenCounter`] when the BPE tables load, otherwise an
/// [`EstimateCounter`].
#[must_use]
pub fn create_counter() -> Box<dyn TokenCounter> {
    match TiktokenCounter::new() {
        Ok(counter) => Box::new(counter),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "tiktoken unavailable, falling back to estimated token counts"
            );
            Box::new(EstimateCounter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_counter() {
        let counter = create_counter();
        assert_eq!(counter.count(""), 0);
        assert!(counter.count("Hello, world!") > 0);
    }

    #[test]
    fn test_counters_agree_on_empty() {
        let counters: Vec<Box<dyn TokenCounter>> =
            vec![Box::new(EstimateCounter), create_counter()];
        for counter in &counters {
            assert_eq!(counter.count(""), 0, "{} counted empty text", counter.name());
        }
    }
}
