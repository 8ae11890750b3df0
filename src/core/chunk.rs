//! Memory chunks and the chunk store.
//!
//! Chunks are produced by the remote splitting service. The store keeps
//! every chunk of the latest split ("all memories") in service order and
//! the subset the query service reported as used ("used memories").

use serde::{Deserialize, Deserializer, Serialize};

/// Separator written after each chunk when assembling context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// A unit of source text produced by the splitting service.
///
/// # Examples
///
/// ```
/// use ragflow::core::MemoryChunk;
///
/// let chunk = MemoryChunk::new("c1", "Hello, world!", 4);
/// assert_eq!(chunk.token_count, 4);
/// assert!(chunk.embedding.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryChunk {
    /// Identifier assigned by the service.
    #[serde(deserialize_with = "string_or_number")]
    pub chunk_id: String,

    /// Chunk text.
    pub text: String,

    /// Token count reported by the service.
    #[serde(default)]
    pub token_count: usize,

    /// Vector embedding of the text.
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl MemoryChunk {
    /// Creates a chunk without an embedding.
    #[must_use]
    pub fn new(chunk_id: impl Into<String>, text: impl Into<String>, token_count: usize) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            text: text.into(),
            token_count,
            embedding: Vec::new(),
        }
    }

    /// Returns a preview of the chunk text (first `max_chars` characters).
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> &str {
        self.text
            .char_indices()
            .nth(max_chars)
            .map_or(self.text.as_str(), |(idx, _)| &self.text[..idx])
    }
}

/// Accepts chunk ids sent either as strings or as numbers.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Float(n) => n.to_string(),
    })
}

/// Count and token total for a list of chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChunkStats {
    /// Number of chunks.
    pub count: usize,
    /// Sum of the chunks' token counts.
    pub tokens: usize,
}

impl ChunkStats {
    /// Computes statistics for `chunks`.
    #[must_use]
    pub fn of(chunks: &[MemoryChunk]) -> Self {
        Self {
            count: chunks.len(),
            tokens: chunks.iter().map(|c| c.token_count).sum(),
        }
    }
}

/// All chunks of the latest split plus the subset used by the last query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkStore {
    all: Vec<MemoryChunk>,
    used: Vec<MemoryChunk>,
}

impl ChunkStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            all: Vec::new(),
            used: Vec::new(),
        }
    }

    /// Every chunk of the latest split, in service order.
    #[must_use]
    pub fn all(&self) -> &[MemoryChunk] {
        &self.all
    }

    /// Chunks the last query reported as used.
    #[must_use]
    pub fn used(&self) -> &[MemoryChunk] {
        &self.used
    }

    /// Replaces all chunks with a new split result and forgets used ones.
    pub fn replace_all(&mut self, chunks: Vec<MemoryChunk>) {
        self.all = chunks;
        self.used.clear();
    }

    /// Replaces the used subset.
    pub fn set_used(&mut self, chunks: Vec<MemoryChunk>) {
        self.used = chunks;
    }

    /// Empties both lists.
    pub fn clear(&mut self) {
        self.all.clear();
        self.used.clear();
    }

    /// Checks if both lists are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.used.is_empty()
    }

    /// Statistics over all chunks.
    #[must_use]
    pub fn all_stats(&self) -> ChunkStats {
        ChunkStats::of(&self.all)
    }

    /// Statistics over the used chunks.
    #[must_use]
    pub fn used_stats(&self) -> ChunkStats {
        ChunkStats::of(&self.used)
    }

    /// Assembles context from the first `limit` chunks.
    ///
    /// Returns `None` when there is nothing to assemble: a non-positive
    /// limit or an empty store.
    #[must_use]
    pub fn assemble_context(&self, limit: i64) -> Option<String> {
        let limit = usize::try_from(limit).ok().filter(|&n| n > 0)?;
        if self.all.is_empty() {
            return None;
        }
        Some(assemble_context(&self.all, limit))
    }
}

/// Concatenates the text of the first `limit` chunks, each followed by a
/// blank line.
///
/// A limit past the end of `chunks` takes every chunk.
///
/// # Examples
///
/// ```
/// use ragflow::core::{MemoryChunk, chunk::assemble_context};
///
/// let chunks = vec![MemoryChunk::new("1", "alpha", 1), MemoryChunk::new("2", "beta", 1)];
/// assert_eq!(assemble_context(&chunks, 1), "alpha\n\n");
/// assert_eq!(assemble_context(&chunks, 10), "alpha\n\nbeta\n\n");
/// ```
#[must_use]
pub fn assemble_context(chunks: &[MemoryChunk], limit: usize) -> String {
    chunks
        .iter()
        .take(limit)
        .fold(String::new(), |mut context, chunk| {
            context.push_str(&chunk.text);
            context.push_str(CONTEXT_SEPARATOR);
            context
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> Vec<MemoryChunk> {
        (0..n)
            .map(|i| MemoryChunk::new(format!("c{i}"), format!("chunk {i}"), i + 1))
            .collect()
    }

    #[test]
    fn test_chunk_deserialize_wire_shape() {
        let json = r#"{"chunkId":"abc","text":"hello","tokenCount":2,"embedding":[0.5,-0.25]}"#;
        let chunk: MemoryChunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.chunk_id, "abc");
        assert_eq!(chunk.text, "hello");
        assert_eq!(chunk.token_count, 2);
        assert_eq!(chunk.embedding, vec![0.5, -0.25]);
    }

    #[test]
    fn test_chunk_numeric_id() {
        let chunk: MemoryChunk = serde_json::from_str(r#"{"chunkId":7,"text":"x"}"#).unwrap();
        assert_eq!(chunk.chunk_id, "7");
        assert_eq!(chunk.token_count, 0);
        assert!(chunk.embedding.is_empty());
    }

    #[test]
    fn test_chunk_serialize_camel_case() {
        let json = serde_json::to_value(MemoryChunk::new("1", "t", 3)).unwrap();
        assert_eq!(json["chunkId"], "1");
        assert_eq!(json["tokenCount"], 3);
    }

    #[test]
    fn test_preview() {
        let chunk = MemoryChunk::new("1", "Hello, 世界!", 1);
        assert_eq!(chunk.preview(5), "Hello");
        assert_eq!(chunk.preview(8), "Hello, 世");
        assert_eq!(chunk.preview(100), "Hello, 世界!");
    }

    #[test]
    fn test_replace_all_clears_used() {
        let mut store = ChunkStore::new();
        store.replace_all(sample(3));
        store.set_used(sample(1));
        assert_eq!(store.used().len(), 1);

        store.replace_all(sample(2));
        assert_eq!(store.all(), sample(2).as_slice());
        assert!(store.used().is_empty());
    }

    #[test]
    fn test_stats() {
        let mut store = ChunkStore::new();
        store.replace_all(sample(3));
        store.set_used(sample(2));
        assert_eq!(store.all_stats(), ChunkStats { count: 3, tokens: 6 });
        assert_eq!(store.used_stats(), ChunkStats { count: 2, tokens: 3 });
    }

    #[test]
    fn test_assemble_first_three_of_five() {
        let mut store = ChunkStore::new();
        store.replace_all(sample(5));
        assert_eq!(
            store.assemble_context(3).as_deref(),
            Some("chunk 0\n\nchunk 1\n\nchunk 2\n\n")
        );
    }

    #[test]
    fn test_assemble_limit_past_end() {
        let mut store = ChunkStore::new();
        store.replace_all(sample(2));
        assert_eq!(
            store.assemble_context(10).as_deref(),
            Some("chunk 0\n\nchunk 1\n\n")
        );
    }

    #[test]
    fn test_assemble_nothing() {
        let mut store = ChunkStore::new();
        assert_eq!(store.assemble_context(3), None);
        store.replace_all(sample(2));
        assert_eq!(store.assemble_context(0), None);
        assert_eq!(store.assemble_context(-4), None);
    }

    #[test]
    fn test_clear() {
        let mut store = ChunkStore::new();
        store.replace_all(sample(2));
        store.set_used(sample(1));
        store.clear();
        assert!(store.is_empty());
    }
}
