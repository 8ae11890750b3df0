//! Remote RAG services.
//!
//! The workflow talks to three services (splitting, document loading and
//! RAG query, which also owns session reset) through the [`RagService`]
//! trait. [`HttpRagService`] is the production implementation.

pub mod config;
pub mod http;
pub mod types;

pub use config::{DEFAULT_BASE_URL, ServiceConfig};
pub use http::HttpRagService;
pub use types::{LoadRequest, LoadResponse, QueryRequest, QueryResponse, SourceFile, SplitRequest};

use crate::Result;
use crate::core::{MemoryChunk, SessionId};
use async_trait::async_trait;

/// Trait for the remote services a session depends on.
///
/// Implementations do not retry and apply no timeout of their own.
#[async_trait]
pub trait RagService: Send + Sync {
    /// Splits the source texts into chunks, embedding them under the
    /// request's session namespace.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails.
    async fn split(&self, request: &SplitRequest) -> Result<Vec<MemoryChunk>>;

    /// Fetches a document and returns its text.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails.
    async fn load(&self, request: &LoadRequest) -> Result<LoadResponse>;

    /// Runs a retrieval-augmented completion in the session namespace.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails.
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse>;

    /// Deletes every piece of remote state held for `session`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails.
    async fn reset(&self, session: &SessionId) -> Result<()>;
}
