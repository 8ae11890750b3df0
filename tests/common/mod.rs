//! Shared test fixtures: a scripted in-process RAG service and controller
//! builders.

#![allow(dead_code, clippy::expect_used)]

use async_trait::async_trait;
use parking_lot::Mutex;
use ragflow::client::{
    LoadRequest, LoadResponse, QueryRequest, QueryResponse, RagService, SplitRequest,
};
use ragflow::core::{MemoryChunk, SessionId};
use ragflow::error::TransportError;
use ragflow::storage::{SqliteStateStore, StateStore};
use ragflow::tokens::EstimateCounter;
use ragflow::{Result, WorkflowController};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Notify;

/// Scripted answer for one kind of call.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    /// Answer with this value.
    Ok(T),
    /// Fail with an HTTP 500.
    Fail,
}

/// A request the fake received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Split(SplitRequest),
    Load(LoadRequest),
    Query(QueryRequest),
    Reset(SessionId),
}

/// In-process `RagService` answering from a script and recording calls.
///
/// When a gate is installed, split, load and query wait for it before
/// answering, so tests can observe the controller mid-flight.
pub struct ScriptedService {
    split: Mutex<Reply<Vec<MemoryChunk>>>,
    load: Mutex<Reply<LoadResponse>>,
    query: Mutex<Reply<QueryResponse>>,
    reset_fails: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl Default for ScriptedService {
    fn default() -> Self {
        Self {
            split: Mutex::new(Reply::Ok(Vec::new())),
            load: Mutex::new(Reply::Ok(LoadResponse {
                content: String::new(),
            })),
            query: Mutex::new(Reply::Ok(QueryResponse {
                context: String::new(),
                completion: String::new(),
                memories: Vec::new(),
            })),
            reset_fails: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
        }
    }
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunks(self, chunks: Vec<MemoryChunk>) -> Self {
        *self.split.lock() = Reply::Ok(chunks);
        self
    }

    pub fn set_split(&self, reply: Reply<Vec<MemoryChunk>>) {
        *self.split.lock() = reply;
    }

    pub fn set_load(&self, reply: Reply<LoadResponse>) {
        *self.load.lock() = reply;
    }

    pub fn set_query(&self, reply: Reply<QueryResponse>) {
        *self.query.lock() = reply;
    }

    pub fn fail_reset(&self) {
        *self.reset_fails.lock() = true;
    }

    /// Makes subsequent split, load and query calls wait for the returned
    /// notifier.
    pub fn hold_calls(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&notify));
        notify
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn split_requests(&self) -> Vec<SplitRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Split(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn query_requests(&self) -> Vec<QueryRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Query(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    async fn wait_for_gate(&self) {
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

fn answer<T: Clone>(reply: &Mutex<Reply<T>>, endpoint: &str) -> Result<T> {
    match &*reply.lock() {
        Reply::Ok(value) => Ok(value.clone()),
        Reply::Fail => Err(TransportError::Status {
            endpoint: endpoint.to_string(),
            status: 500,
        }
        .into()),
    }
}

#[async_trait]
impl RagService for ScriptedService {
    async fn split(&self, request: &SplitRequest) -> Result<Vec<MemoryChunk>> {
        self.calls.lock().push(Call::Split(request.clone()));
        self.wait_for_gate().await;
        answer(&self.split, "split")
    }

    async fn load(&self, request: &LoadRequest) -> Result<LoadResponse> {
        self.calls.lock().push(Call::Load(request.clone()));
        self.wait_for_gate().await;
        answer(&self.load, "load")
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        self.calls.lock().push(Call::Query(request.clone()));
        self.wait_for_gate().await;
        answer(&self.query, "query")
    }

    async fn reset(&self, session: &SessionId) -> Result<()> {
        self.calls.lock().push(Call::Reset(session.clone()));
        if *self.reset_fails.lock() {
            return Err(TransportError::Other("connection refused".to_string()).into());
        }
        Ok(())
    }
}

/// Numbered chunks `chunk-1 .. chunk-n` with ids `1 .. n`.
pub fn numbered_chunks(n: usize) -> Vec<MemoryChunk> {
    (1..=n)
        .map(|i| MemoryChunk::new(i.to_string(), format!("chunk-{i}"), i))
        .collect()
}

/// Controller over an in-memory store with estimated token counts.
pub fn controller(service: ScriptedService) -> WorkflowController<ScriptedService> {
    let store = SqliteStateStore::in_memory().expect("in-memory store");
    WorkflowController::new(service, Box::new(EstimateCounter), Box::new(store))
        .expect("controller")
}

/// Controller over a state file, for tests that reopen the same state.
pub fn file_controller(
    service: ScriptedService,
    path: &Path,
) -> WorkflowController<ScriptedService> {
    let store: Box<dyn StateStore> =
        Box::new(SqliteStateStore::open(path).expect("file store"));
    WorkflowController::new(service, Box::new(EstimateCounter), store).expect("controller")
}
