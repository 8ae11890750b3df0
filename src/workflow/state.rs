//! Session state owned by the workflow controller.

use crate::core::{
    ChunkStats, ChunkStore, Phase, SessionId, Settings, SplittingMethod, SubmitLabel, TextBuffers,
    TokenCounts,
};
use crate::storage::PersistedState;
use crate::tokens::TokenCounter;
use serde::Serialize;

/// Everything one client session holds.
///
/// Settings, both source texts and the session id are persisted by the
/// controller; the rest lives in memory only.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// User-tunable parameters.
    pub settings: Settings,
    /// Source, context and completion texts.
    pub buffers: TextBuffers,
    /// Displayed token counts.
    pub counts: TokenCounts,
    /// Chunks of the latest split and of the latest query.
    pub chunks: ChunkStore,
    /// Namespace of this session's remote state.
    pub session_id: SessionId,
    /// Active buffer cursor.
    pub phase: Phase,
    /// Label of the submit control.
    pub submit_label: SubmitLabel,
}

impl SessionState {
    /// Creates a fresh state for `session_id` with default settings.
    #[must_use]
    pub fn new(session_id: SessionId) -> Self {
        Self {
            settings: Settings::default(),
            buffers: TextBuffers::default(),
            counts: TokenCounts::default(),
            chunks: ChunkStore::new(),
            session_id,
            phase: Phase::default(),
            submit_label: SubmitLabel::default(),
        }
    }

    /// Restores the persisted records into a fresh state.
    #[must_use]
    pub fn restore(persisted: PersistedState, session_id: SessionId) -> Self {
        let mut state = Self::new(session_id);
        state.settings = persisted.settings;
        state.buffers.text1 = persisted.text1;
        state.buffers.text2 = persisted.text2;
        state
    }

    /// Reinitializes everything under a new session id.
    pub fn reset_to(&mut self, session_id: SessionId) {
        *self = Self::new(session_id);
    }

    /// Recomputes every token count.
    pub fn refresh_counts(&mut self, counter: &dyn TokenCounter) {
        self.counts = TokenCounts::compute(counter, &self.buffers, &self.settings.prompt);
    }

    /// Builds a read-only summary.
    #[must_use]
    pub fn snapshot(&self, busy: bool) -> StatusSnapshot {
        StatusSnapshot {
            session_id: self.session_id.clone(),
            phase: self.phase,
            busy,
            submit_label: self.submit_label.as_str(),
            method: self.settings.method,
            counts: self.counts,
            all_chunks: self.chunks.all_stats(),
            used_chunks: self.chunks.used_stats(),
        }
    }
}

/// Serializable view of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    /// Session namespace.
    pub session_id: SessionId,
    /// Active buffer cursor.
    pub phase: Phase,
    /// Whether a remote operation is in flight.
    pub busy: bool,
    /// Label of the submit control.
    pub submit_label: &'static str,
    /// Active splitting method.
    pub method: SplittingMethod,
    /// Token counts.
    pub counts: TokenCounts,
    /// Statistics over all chunks.
    pub all_chunks: ChunkStats,
    /// Statistics over the used chunks.
    pub used_chunks: ChunkStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BufferSlot, MemoryChunk};
    use crate::tokens::EstimateCounter;

    fn populated() -> SessionState {
        let mut state = SessionState::new(SessionId::from_existing("user_000000000001"));
        state.settings.chunks = "9".to_string();
        state.buffers.set_source(BufferSlot::First, "first text".to_string());
        state.buffers.context = "ctx".to_string();
        state.chunks.replace_all(vec![MemoryChunk::new("1", "a", 1)]);
        state.phase = Phase::Completion;
        state.submit_label = SubmitLabel::Submit;
        state.refresh_counts(&EstimateCounter);
        state
    }

    #[test]
    fn test_reset_to_clears_everything() {
        let mut state = populated();
        let next = SessionId::from_existing("user_000000000002");
        state.reset_to(next.clone());
        assert_eq!(state, SessionState::new(next));
        assert!(state.counts.is_zero());
        assert!(state.chunks.is_empty());
        assert_eq!(state.phase, Phase::Chunk);
        assert_eq!(state.submit_label, SubmitLabel::Process);
    }

    #[test]
    fn test_restore_keeps_persisted_records_only() {
        let persisted = PersistedState {
            text1: "one".to_string(),
            text2: "two".to_string(),
            ..PersistedState::default()
        };
        let state = SessionState::restore(persisted, SessionId::from_existing("user_x"));
        assert_eq!(state.buffers.text1, "one");
        assert_eq!(state.buffers.text2, "two");
        assert!(state.buffers.context.is_empty());
        assert!(state.counts.is_zero());
    }

    #[test]
    fn test_snapshot_reports_chunk_stats() {
        let state = populated();
        let snapshot = state.snapshot(true);
        assert!(snapshot.busy);
        assert_eq!(snapshot.all_chunks.count, 1);
        assert_eq!(snapshot.used_chunks.count, 0);
        assert_eq!(snapshot.submit_label, "Submit");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"], "completion");
        assert_eq!(json["session_id"], "user_000000000001");
    }
}
