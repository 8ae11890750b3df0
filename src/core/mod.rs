//! Core domain models for ragflow.
//!
//! This module contains the session's data: settings, text buffers, token
//! counts, chunks, the session id and the workflow phase. These are pure
//! domain models with no I/O dependencies.

pub mod buffer;
pub mod chunk;
pub mod numeric;
pub mod phase;
pub mod session;
pub mod settings;

pub use buffer::{BufferSlot, TextBuffers, TokenCounts};
pub use chunk::{ChunkStats, ChunkStore, MemoryChunk};
pub use phase::{Phase, SubmitLabel};
pub use session::SessionId;
pub use settings::{Settings, SplittingMethod};
