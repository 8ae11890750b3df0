//! Permissive numeric parsing for string-valued settings.
//!
//! Settings are stored as the user typed them. Numbers are read at the point
//! of use by taking the longest numeric prefix after leading whitespace, so
//! `"12abc"` reads as 12 and `" 0.7 "` as 0.7. Input with no numeric prefix
//! reads as `None` (not-a-number); it never fails.

use regex::Regex;
use std::sync::OnceLock;

/// Leading integer prefix: optional sign followed by digits.
fn int_prefix() -> &'static Regex {
    static INT_PREFIX: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    INT_PREFIX.get_or_init(|| Regex::new(r"^[+-]?\d+").expect("valid regex"))
}

/// Leading float prefix: decimal with optional exponent, or `Infinity`.
fn float_prefix() -> &'static Regex {
    static FLOAT_PREFIX: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    FLOAT_PREFIX.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").expect("valid regex")
    })
}

/// Parses the leading integer of `input`.
///
/// Returns `None` when there is no integer prefix or it does not fit in `i64`.
///
/// # Examples
///
/// ```
/// use ragflow::core::numeric::parse_int;
///
/// assert_eq!(parse_int("512"), Some(512));
/// assert_eq!(parse_int("  10 tokens"), Some(10));
/// assert_eq!(parse_int("3.9"), Some(3));
/// assert_eq!(parse_int("abc"), None);
/// ```
#[must_use]
pub fn parse_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let m = int_prefix().find(trimmed)?;
    m.as_str().parse().ok()
}

/// Parses the leading floating point number of `input`.
///
/// # Examples
///
/// ```
/// use ragflow::core::numeric::parse_float;
///
/// assert_eq!(parse_float("0.7"), Some(0.7));
/// assert_eq!(parse_float(".5x"), Some(0.5));
/// assert_eq!(parse_float("warm"), None);
/// ```
#[must_use]
pub fn parse_float(input: &str) -> Option<f64> {
    let trimmed = input.trim_start();
    let m = float_prefix().find(trimmed)?;
    m.as_str().parse().ok()
}
