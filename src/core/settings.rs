//! User-tunable workflow settings.
//!
//! Settings hold every parameter the user can tweak: splitting method,
//! size limits for the splitting service and the parameters of the RAG
//! query. Numeric fields are kept as the raw strings the user entered and
//! are parsed permissively at the point of use.

use crate::core::numeric::{parse_float, parse_int};
use crate::error::{CommandError, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chunk splitting strategy requested from the splitting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SplittingMethod {
    /// Token-based splitting using the service's own tokenizer.
    #[serde(rename = "SK")]
    Sk,
    /// Token-based splitting using a tiktoken tokenizer.
    #[default]
    #[serde(rename = "SKTiktoken")]
    SkTiktoken,
    /// One chunk per paragraph.
    Paragraph,
    /// Paragraphs capped by word count.
    ParagraphWords,
}

impl SplittingMethod {
    /// All methods, in the order they are offered to the user.
    pub const ALL: [Self; 4] = [
        Self::SkTiktoken,
        Self::Sk,
        Self::Paragraph,
        Self::ParagraphWords,
    ];

    /// Returns the wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sk => "SK",
            Self::SkTiktoken => "SKTiktoken",
            Self::Paragraph => "Paragraph",
            Self::ParagraphWords => "ParagraphWords",
        }
    }
}

impl fmt::Display for SplittingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplittingMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sk" => Ok(Self::Sk),
            "sktiktoken" | "tiktoken" | "tokens" => Ok(Self::SkTiktoken),
            "paragraph" | "paragraphs" => Ok(Self::Paragraph),
            "paragraphwords" | "paragraph-words" => Ok(Self::ParagraphWords),
            _ => Err(
                CommandError::InvalidArgument(format!("unknown splitting method: {s}")).into(),
            ),
        }
    }
}

/// The persisted settings record.
///
/// Field names on the wire and on disk match the keys the services and
/// earlier clients use, so a stored record round-trips unchanged.
///
/// # Examples
///
/// ```
/// use ragflow::core::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.chunk_limit(), Some(3));
/// assert_eq!(settings.relevance_threshold(), Some(0.7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Per-line token cap.
    #[serde(rename = "maxTokensPerLine")]
    pub max_tokens_per_line: String,

    /// Per-paragraph token cap.
    #[serde(rename = "maxTokensPerParagraph")]
    pub max_tokens_per_paragraph: String,

    /// Overlap between consecutive chunks, in tokens.
    #[serde(rename = "overlapTokens")]
    pub overlap_tokens: String,

    /// Word count cap for the paragraph methods.
    #[serde(rename = "wordCount")]
    pub word_count: String,

    /// Active splitting method.
    pub method: SplittingMethod,

    /// Retrieval chunk limit.
    pub chunks: String,

    /// Relevance threshold for retrieval.
    pub relevance: String,

    /// Prompt text.
    pub prompt: String,

    /// Maximum completion tokens.
    pub max_tokens: String,

    /// Sampling temperature.
    pub temperature: String,

    /// Source document URL.
    pub url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_tokens_per_line: "512".to_string(),
            max_tokens_per_paragraph: "512".to_string(),
            overlap_tokens: "0".to_string(),
            word_count: "512".to_string(),
            method: SplittingMethod::default(),
            chunks: "3".to_string(),
            relevance: "0.7".to_string(),
            prompt: String::new(),
            max_tokens: "1024".to_string(),
            temperature: "0.3".to_string(),
            url: String::new(),
        }
    }
}

impl Settings {
    /// Names accepted by [`Settings::get`] and [`Settings::set`].
    pub const FIELDS: [&'static str; 11] = [
        "method",
        "maxTokensPerLine",
        "maxTokensPerParagraph",
        "overlapTokens",
        "wordCount",
        "chunks",
        "relevance",
        "prompt",
        "max_tokens",
        "temperature",
        "url",
    ];

    /// Returns the raw value of a field by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<String> {
        let value: &str = match field {
            "method" => self.method.as_str(),
            "maxTokensPerLine" => &self.max_tokens_per_line,
            "maxTokensPerParagraph" => &self.max_tokens_per_paragraph,
            "overlapTokens" => &self.overlap_tokens,
            "wordCount" => &self.word_count,
            "chunks" | "limit" => &self.chunks,
            "relevance" => &self.relevance,
            "prompt" => &self.prompt,
            "max_tokens" => &self.max_tokens,
            "temperature" => &self.temperature,
            "url" => &self.url,
            _ => return None,
        };
        Some(value.to_string())
    }

    /// Replaces the value of a field by name.
    ///
    /// Values are stored verbatim; only the splitting method is checked,
    /// since it is an enumeration.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown field or splitting method.
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        let value = value.to_string();
        match field {
            "method" => self.method = value.parse()?,
            "maxTokensPerLine" => self.max_tokens_per_line = value,
            "maxTokensPerParagraph" => self.max_tokens_per_paragraph = value,
            "overlapTokens" => self.overlap_tokens = value,
            "wordCount" => self.word_count = value,
            "chunks" | "limit" => self.chunks = value,
            "relevance" => self.relevance = value,
            "prompt" => self.prompt = value,
            "max_tokens" => self.max_tokens = value,
            "temperature" => self.temperature = value,
            "url" => self.url = value,
            _ => {
                return Err(
                    CommandError::InvalidArgument(format!("unknown setting: {field}")).into(),
                );
            }
        }
        Ok(())
    }

    /// Parsed retrieval chunk limit.
    #[must_use]
    pub fn chunk_limit(&self) -> Option<i64> {
        parse_int(&self.chunks)
    }

    /// Parsed relevance threshold.
    #[must_use]
    pub fn relevance_threshold(&self) -> Option<f64> {
        parse_float(&self.relevance)
    }

    /// Parsed maximum completion tokens.
    #[must_use]
    pub fn max_completion_tokens(&self) -> Option<i64> {
        parse_int(&self.max_tokens)
    }

    /// Parsed sampling temperature.
    #[must_use]
    pub fn sampling_temperature(&self) -> Option<f64> {
        parse_float(&self.temperature)
    }

    /// Parsed per-line token cap.
    #[must_use]
    pub fn line_token_cap(&self) -> Option<i64> {
        parse_int(&self.max_tokens_per_line)
    }

    /// Parsed overlap token count.
    #[must_use]
    pub fn overlap(&self) -> Option<i64> {
        parse_int(&self.overlap_tokens)
    }

    /// Per-paragraph cap sent to the splitting service.
    ///
    /// `Paragraph` is capped by the word count; every other method reuses
    /// the per-line token cap.
    #[must_use]
    pub fn paragraph_cap(&self) -> Option<i64> {
        match self.method {
            SplittingMethod::Paragraph => parse_int(&self.word_count),
            _ => parse_int(&self.max_tokens_per_line),
        }
    }
}
