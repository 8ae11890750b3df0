//! Workflow controller.
//!
//! Owns the session state and drives the remote operations against it.
//! Split, document load and query share one busy gate: while one of them
//! is in flight, starting another is a no-op. Remote failures are logged
//! and reported through [`Outcome`]; they never leave the state half
//! updated.

use crate::client::{LoadRequest, QueryRequest, RagService, SplitRequest};
use crate::core::{
    BufferSlot, ChunkStore, Phase, SessionId, Settings, SubmitLabel, TextBuffers, TokenCounts,
    buffer::prompt_tokens,
};
use crate::error::{Error, Result};
use crate::storage::persisted::{save_session, save_settings, save_text};
use crate::storage::{PersistedState, StateStore};
use crate::tokens::TokenCounter;
use crate::workflow::busy::BusyFlag;
use crate::workflow::state::{SessionState, StatusSnapshot};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

/// URL placeholder shown while a document loads.
pub const LOADING_PLACEHOLDER: &str = "Loading ...";

/// Result of a gated remote operation.
#[derive(Debug)]
pub enum Outcome {
    /// The operation ran and its result was applied.
    Completed,
    /// Another operation was in flight; nothing happened.
    Skipped,
    /// The remote call failed; the error was logged and the state kept.
    Failed(Error),
}

impl Outcome {
    /// Returns true if the operation's result was applied.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if the operation was dropped because of the busy gate.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Orchestrates one client session.
///
/// The controller is the only writer of its [`SessionState`]. State locks
/// are never held across an await point; when both are needed the state
/// lock is taken before the store lock.
pub struct WorkflowController<S: RagService> {
    service: S,
    counter: Box<dyn TokenCounter>,
    store: Mutex<Box<dyn StateStore>>,
    state: Mutex<SessionState>,
    busy: BusyFlag,
}

impl<S: RagService> WorkflowController<S> {
    /// Creates a controller, restoring persisted state from `store`.
    ///
    /// A session id is generated and persisted on first start.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be initialized.
    pub fn new(
        service: S,
        counter: Box<dyn TokenCounter>,
        mut store: Box<dyn StateStore>,
    ) -> Result<Self> {
        store.init()?;
        let persisted = PersistedState::load(store.as_ref());

        let session_id = if let Some(id) = persisted.session_id.clone() {
            id
        } else {
            let id = SessionId::generate();
            info!(session = %id, "starting new session");
            save_session(store.as_mut(), &id)?;
            id
        };

        let mut state = SessionState::restore(persisted, session_id);
        state.refresh_counts(counter.as_ref());

        Ok(Self {
            service,
            counter,
            store: Mutex::new(store),
            state: Mutex::new(state),
            busy: BusyFlag::new(),
        })
    }

    /// Returns the remote service.
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Returns the token counter.
    pub fn counter(&self) -> &dyn TokenCounter {
        self.counter.as_ref()
    }

    /// Returns a copy of the current settings.
    pub fn settings(&self) -> Settings {
        self.state.lock().settings.clone()
    }

    /// Returns a copy of the text buffers.
    pub fn buffers(&self) -> TextBuffers {
        self.state.lock().buffers.clone()
    }

    /// Returns the current token counts.
    pub fn counts(&self) -> TokenCounts {
        self.state.lock().counts
    }

    /// Returns a copy of the chunk store.
    pub fn chunks(&self) -> ChunkStore {
        self.state.lock().chunks.clone()
    }

    /// Returns the session id.
    pub fn session_id(&self) -> SessionId {
        self.state.lock().session_id.clone()
    }

    /// Returns the active phase.
    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    /// Returns the submit label.
    pub fn submit_label(&self) -> SubmitLabel {
        self.state.lock().submit_label
    }

    /// Returns true while a remote operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Returns a serializable status summary.
    pub fn status(&self) -> StatusSnapshot {
        let busy = self.busy.is_busy();
        self.state.lock().snapshot(busy)
    }

    /// Returns a copy of the whole session state.
    pub fn snapshot_state(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// Moves the buffer cursor. Every phase is reachable directly.
    pub fn set_phase(&self, phase: Phase) {
        self.state.lock().phase = phase;
    }

    /// Applies `update` to the settings and persists them.
    pub fn update_settings<F>(&self, update: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut state = self.state.lock();
        update(&mut state.settings);
        self.persist_settings(&state.settings);
    }

    /// Sets one setting by name and persists the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `field` is not a setting name or the method name
    /// is unknown. Numeric values are never validated.
    pub fn set_setting(&self, field: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.settings.set(field, value)?;
        if field == "prompt" {
            let prompt = prompt_tokens(
                self.counter.as_ref(),
                &state.settings.prompt,
                &state.buffers.context,
            );
            state.counts.prompt = prompt;
        }
        self.persist_settings(&state.settings);
        Ok(())
    }

    /// Replaces one source text and refreshes both source counts.
    pub fn edit_text(&self, slot: BufferSlot, value: impl Into<String>) {
        let mut state = self.state.lock();
        state.buffers.set_source(slot, value.into());
        state.counts.text1 = self.counter.count(&state.buffers.text1);
        state.counts.text2 = self.counter.count(&state.buffers.text2);
        self.persist_text(slot, state.buffers.source(slot));
    }

    /// Replaces the context and refreshes the context count only.
    ///
    /// The prompt count, which covers prompt plus context, keeps its old
    /// value until the prompt is edited or counts are refreshed.
    pub fn edit_context(&self, value: impl Into<String>) {
        let mut state = self.state.lock();
        state.buffers.context = value.into();
        state.counts.context = self.counter.count(&state.buffers.context);
    }

    /// Replaces the prompt and refreshes the prompt count.
    pub fn edit_prompt(&self, value: impl Into<String>) {
        let mut state = self.state.lock();
        state.settings.prompt = value.into();
        state.counts.prompt = prompt_tokens(
            self.counter.as_ref(),
            &state.settings.prompt,
            &state.buffers.context,
        );
        self.persist_settings(&state.settings);
    }

    /// Replaces the completion and refreshes the completion count.
    pub fn edit_completion(&self, value: impl Into<String>) {
        let mut state = self.state.lock();
        state.buffers.completion = value.into();
        state.counts.completion = self.counter.count(&state.buffers.completion);
    }

    /// Replaces the prompt with a sample and refreshes every count.
    pub fn load_sample_prompt(&self, prompt: impl Into<String>) {
        let mut state = self.state.lock();
        state.settings.prompt = prompt.into();
        state.refresh_counts(self.counter.as_ref());
        self.persist_settings(&state.settings);
    }

    /// Recomputes every token count.
    pub fn update_token_counts(&self) -> TokenCounts {
        let mut state = self.state.lock();
        state.refresh_counts(self.counter.as_ref());
        state.counts
    }

    /// Fills the context from the first `chunks` stored chunks.
    ///
    /// Returns false, changing nothing, when the limit does not parse, is
    /// not positive, or no chunks are stored.
    pub fn load_context(&self) -> bool {
        let mut state = self.state.lock();
        let Some(limit) = state.settings.chunk_limit() else {
            debug!(chunks = %state.settings.chunks, "context not loaded: limit does not parse");
            return false;
        };
        let Some(context) = state.chunks.assemble_context(limit) else {
            debug!(limit, "context not loaded: nothing to assemble");
            return false;
        };
        state.buffers.context = context;
        state.refresh_counts(self.counter.as_ref());
        true
    }

    /// Splits both source texts into chunks.
    ///
    /// On success the chunk store is replaced, counts are refreshed and the
    /// phase moves to [`Phase::Prompt`]. On failure nothing but the busy
    /// gate changes.
    pub async fn split(&self) -> Outcome {
        let Some(_guard) = self.busy.try_acquire() else {
            warn!("split skipped: another operation is in flight");
            return Outcome::Skipped;
        };
        self.run_split().await
    }

    /// Replaces both source texts, then splits them.
    ///
    /// Nothing changes while another operation is in flight.
    pub async fn load_and_split(
        &self,
        text1: impl Into<String>,
        text2: impl Into<String>,
    ) -> Outcome {
        let Some(_guard) = self.busy.try_acquire() else {
            warn!("load and split skipped: another operation is in flight");
            return Outcome::Skipped;
        };
        {
            let mut state = self.state.lock();
            state.buffers.text1 = text1.into();
            state.buffers.text2 = text2.into();
            state.refresh_counts(self.counter.as_ref());
            for slot in BufferSlot::ALL {
                self.persist_text(slot, state.buffers.source(slot));
            }
        }
        self.run_split().await
    }

    async fn run_split(&self) -> Outcome {
        let request = {
            let mut state = self.state.lock();
            state.counts.text1 = self.counter.count(&state.buffers.text1);
            SplitRequest::new(state.session_id.clone(), &state.buffers, &state.settings)
        };
        info!(
            session = %request.session_id,
            method = %request.method,
            "splitting source texts"
        );

        match self.service.split(&request).await {
            Ok(chunks) => {
                info!(chunks = chunks.len(), "split completed");
                let mut state = self.state.lock();
                state.chunks.replace_all(chunks);
                state.refresh_counts(self.counter.as_ref());
                state.phase = Phase::Prompt;
                Outcome::Completed
            }
            Err(e) => {
                error!(error = %e, "split failed");
                Outcome::Failed(e)
            }
        }
    }

    /// Fetches the document at the `url` setting into the first source
    /// text.
    ///
    /// The URL setting shows [`LOADING_PLACEHOLDER`] while the request is in
    /// flight and is cleared afterwards whatever the result.
    pub async fn load_document(&self) -> Outcome {
        let Some(_guard) = self.busy.try_acquire() else {
            warn!("document load skipped: another operation is in flight");
            return Outcome::Skipped;
        };

        let request = {
            let mut state = self.state.lock();
            let url = std::mem::replace(&mut state.settings.url, LOADING_PLACEHOLDER.to_string());
            self.persist_settings(&state.settings);
            LoadRequest { url }
        };
        info!(url = %request.url, "loading document");

        let outcome = match self.service.load(&request).await {
            Ok(response) => {
                info!(bytes = response.content.len(), "document loaded");
                let mut state = self.state.lock();
                state.buffers.text1 = response.content;
                state.refresh_counts(self.counter.as_ref());
                self.persist_text(BufferSlot::First, &state.buffers.text1);
                Outcome::Completed
            }
            Err(e) => {
                error!(url = %request.url, error = %e, "document load failed");
                Outcome::Failed(e)
            }
        };

        let mut state = self.state.lock();
        state.settings.url.clear();
        self.persist_settings(&state.settings);
        outcome
    }

    /// Runs the prompt against the session's chunks.
    ///
    /// On success context, completion and the used chunks are replaced, the
    /// phase moves to [`Phase::Completion`] and counts are refreshed. The
    /// submit label reads busy while the request runs.
    pub async fn query(&self) -> Outcome {
        let Some(_guard) = self.busy.try_acquire() else {
            warn!("query skipped: another operation is in flight");
            return Outcome::Skipped;
        };

        let request = {
            let mut state = self.state.lock();
            state.submit_label = SubmitLabel::Busy;
            QueryRequest::new(state.session_id.clone(), &state.settings)
        };
        info!(
            collection = %request.collection,
            limit = ?request.limit,
            relevance = ?request.relevance,
            "querying"
        );

        let result = self.service.query(&request).await;
        let mut state = self.state.lock();
        state.submit_label = SubmitLabel::Submit;
        match result {
            Ok(response) => {
                info!(used = response.memories.len(), "query completed");
                state.buffers.context = response.context;
                state.buffers.completion = response.completion;
                state.chunks.set_used(response.memories);
                state.phase = Phase::Completion;
                state.refresh_counts(self.counter.as_ref());
                Outcome::Completed
            }
            Err(e) => {
                error!(error = %e, "query failed");
                Outcome::Failed(e)
            }
        }
    }

    /// Deletes the session's remote state and starts a new session.
    ///
    /// The remote delete is best effort and ignores the busy gate; local
    /// state is reinitialized after it returns whatever its result.
    pub async fn reset(&self) -> SessionId {
        let previous = self.session_id();
        info!(session = %previous, "resetting session");
        if let Err(e) = self.service.reset(&previous).await {
            error!(session = %previous, error = %e, "remote reset failed");
        }

        let next = SessionId::generate();
        let mut state = self.state.lock();
        state.reset_to(next.clone());
        self.busy.clear();

        let mut store = self.store.lock();
        if let Err(e) = persist_all(&mut **store, &state) {
            warn!(error = %e, "failed to persist reset state");
        }
        info!(session = %next, "new session started");
        next
    }

    fn persist_settings(&self, settings: &Settings) {
        let mut store = self.store.lock();
        if let Err(e) = save_settings(&mut **store, settings) {
            warn!(error = %e, "failed to persist settings");
        }
    }

    fn persist_text(&self, slot: BufferSlot, text: &str) {
        let mut store = self.store.lock();
        if let Err(e) = save_text(&mut **store, slot, text) {
            warn!(slot = %slot, error = %e, "failed to persist text");
        }
    }
}

fn persist_all(store: &mut dyn StateStore, state: &SessionState) -> Result<()> {
    save_settings(store, &state.settings)?;
    for slot in BufferSlot::ALL {
        save_text(store, slot, state.buffers.source(slot))?;
    }
    save_session(store, &state.session_id)
}
