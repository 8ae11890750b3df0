//! Storage layer for ragflow.
//!
//! Keeps the client state that must survive a restart (settings, both
//! source texts and the session id) in `SQLite`. Each record lives under its
//! own key so it can be written independently of the others.

pub mod persisted;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use persisted::PersistedState;
pub use schema::{CURRENT_SCHEMA_VERSION, SCHEMA_SQL};
pub use sqlite::SqliteStateStore;
pub use traits::StateStore;

/// Key holding the settings JSON object.
pub const SETTINGS_KEY: &str = "settings";

/// Key holding the session id.
pub const SESSION_KEY: &str = "sessionId";

/// Default database path relative to the working directory.
pub const DEFAULT_STATE_PATH: &str = ".ragflow/state.db";
