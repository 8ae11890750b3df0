//! Request and response bodies exchanged with the RAG services.
//!
//! Numeric fields are sent as parsed from the settings; a value that does
//! not parse is sent as `null`.

use crate::core::{BufferSlot, MemoryChunk, SessionId, Settings, SplittingMethod, TextBuffers};
use serde::{Deserialize, Serialize};

/// A named source text sent for splitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// File name (`file1`, `file2`).
    pub name: String,
    /// Text content.
    pub content: String,
}

/// Body of the split request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitRequest {
    /// Session namespace for the produced chunks.
    pub session_id: SessionId,
    /// Both source texts, first buffer first.
    pub files: Vec<SourceFile>,
    /// Per-line token cap.
    pub max_tokens_per_line: Option<i64>,
    /// Per-paragraph cap (word count for `Paragraph`, else the line cap).
    pub max_tokens_per_paragraph: Option<i64>,
    /// Overlap between chunks, in tokens.
    pub overlap_tokens: Option<i64>,
    /// Splitting method.
    pub method: SplittingMethod,
}

impl SplitRequest {
    /// Builds the request for the current buffers and settings.
    #[must_use]
    pub fn new(session_id: SessionId, buffers: &TextBuffers, settings: &Settings) -> Self {
        let files = BufferSlot::ALL
            .iter()
            .map(|&slot| SourceFile {
                name: slot.file_name().to_string(),
                content: buffers.source(slot).to_string(),
            })
            .collect();

        Self {
            session_id,
            files,
            max_tokens_per_line: settings.line_token_cap(),
            max_tokens_per_paragraph: settings.paragraph_cap(),
            overlap_tokens: settings.overlap(),
            method: settings.method,
        }
    }
}

/// Body of the document load request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    /// Document URL.
    pub url: String,
}

/// Response of the document load request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResponse {
    /// Extracted document text.
    pub content: String,
}

/// Body of the RAG query request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Session namespace to retrieve from.
    pub collection: SessionId,
    /// Prompt text.
    pub prompt: String,
    /// Maximum number of chunks to retrieve.
    pub limit: Option<i64>,
    /// Minimum relevance of retrieved chunks.
    pub relevance: Option<f64>,
    /// Maximum completion tokens.
    pub max_tokens: Option<i64>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
}

impl QueryRequest {
    /// Builds the request from the current settings.
    #[must_use]
    pub fn new(collection: SessionId, settings: &Settings) -> Self {
        Self {
            collection,
            prompt: settings.prompt.clone(),
            limit: settings.chunk_limit(),
            relevance: settings.relevance_threshold(),
            max_tokens: settings.max_completion_tokens(),
            temperature: settings.sampling_temperature(),
        }
    }
}

/// Response of the RAG query request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Context the service assembled from retrieved chunks.
    #[serde(default)]
    pub context: String,
    /// Completion text.
    #[serde(default)]
    pub completion: String,
    /// Chunks used to build the context.
    #[serde(default)]
    pub memories: Vec<MemoryChunk>,
}
