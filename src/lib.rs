//! # ragflow
//!
//! Client-side orchestration for a retrieval-augmented generation workflow.
//!
//! ragflow keeps a user's working texts, has a remote service split them
//! into retrievable chunks, assembles a context window from those chunks
//! and submits an augmented prompt for completion, tracking token counts
//! throughout.
//!
//! ## Features
//!
//! - **Workflow controller**: split, document load and query behind a
//!   single busy gate, plus session reset
//! - **Token accounting**: tiktoken (`cl100k_base`) counts with an estimate
//!   fallback
//! - **`SQLite` Storage**: settings, source texts and session id survive
//!   restarts
//! - **HTTP client**: JSON over `reqwest` against configurable endpoints

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod client;
pub mod core;
pub mod error;
pub mod storage;
pub mod tokens;
pub mod workflow;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{
    BufferSlot, ChunkStats, ChunkStore, MemoryChunk, Phase, SessionId, Settings, SplittingMethod,
    SubmitLabel, TextBuffers, TokenCounts,
};

// Re-export client types
pub use client::{HttpRagService, RagService, ServiceConfig};

// Re-export storage types
pub use storage::{DEFAULT_STATE_PATH, SqliteStateStore, StateStore};

// Re-export token counters
pub use tokens::{EstimateCounter, TiktokenCounter, TokenCounter, create_counter};

// Re-export workflow types
pub use workflow::{Outcome, StatusSnapshot, WorkflowController};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
