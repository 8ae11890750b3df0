//! Typed access to the persisted client state.
//!
//! Values are stored as JSON documents. Reads never fail the caller: a
//! missing or unreadable record falls back to its default.

use crate::core::{BufferSlot, SessionId, Settings};
use crate::error::{Result, StorageError};
use crate::storage::traits::StateStore;
use crate::storage::{SESSION_KEY, SETTINGS_KEY};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Snapshot of everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    /// Stored settings, defaults when absent.
    pub settings: Settings,
    /// First source text.
    pub text1: String,
    /// Second source text.
    pub text2: String,
    /// Stored session id, `None` on first start.
    pub session_id: Option<SessionId>,
}

impl PersistedState {
    /// Reads the persisted state, falling back to defaults per record.
    #[must_use]
    pub fn load(store: &dyn StateStore) -> Self {
        Self {
            settings: read_or_default(store, SETTINGS_KEY).unwrap_or_default(),
            text1: read_or_default(store, BufferSlot::First.storage_key()).unwrap_or_default(),
            text2: read_or_default(store, BufferSlot::Second.storage_key()).unwrap_or_default(),
            session_id: read_or_default::<SessionId>(store, SESSION_KEY)
                .filter(|id| !id.is_empty()),
        }
    }

    /// Returns the stored text for `slot`.
    #[must_use]
    pub fn source(&self, slot: BufferSlot) -> &str {
        match slot {
            BufferSlot::First => &self.text1,
            BufferSlot::Second => &self.text2,
        }
    }
}

/// Persists the settings record.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_settings(store: &mut dyn StateStore, settings: &Settings) -> Result<()> {
    write(store, SETTINGS_KEY, settings)
}

/// Persists one source text.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn save_text(store: &mut dyn StateStore, slot: BufferSlot, text: &str) -> Result<()> {
    write(store, slot.storage_key(), &text)
}

/// Persists the session id.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn save_session(store: &mut dyn StateStore, session: &SessionId) -> Result<()> {
    write(store, SESSION_KEY, session)
}

fn write<T: Serialize + ?Sized>(store: &mut dyn StateStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value).map_err(StorageError::from)?;
    store.put(key, &json)
}

fn read_or_default<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key, error = %e, "failed to read persisted state");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "discarding unreadable persisted state");
            None
        }
    }
}
