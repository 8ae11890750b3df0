//! Session workflow.
//!
//! The [`WorkflowController`] owns a session's state and runs the split,
//! document load, query and reset operations against a [`RagService`].
//!
//! [`RagService`]: crate::client::RagService

pub mod busy;
pub mod controller;
pub mod state;

pub use busy::{BusyFlag, BusyGuard};
pub use controller::{LOADING_PLACEHOLDER, Outcome, WorkflowController};
pub use state::{SessionState, StatusSnapshot};
