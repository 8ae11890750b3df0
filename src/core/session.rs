//! Session identity.
//!
//! Every session gets a short random identifier that namespaces its chunks
//! and embeddings on the remote services.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Literal tag every session id starts with.
pub const SESSION_PREFIX: &str = "user_";

/// Number of hex characters taken from the random UUID.
pub const SESSION_SUFFIX_LEN: usize = 12;

/// Identifier namespacing a session's remote state.
///
/// # Examples
///
/// ```
/// use ragflow::core::SessionId;
///
/// let id = SessionId::generate();
/// assert!(id.as_str().starts_with("user_"));
/// assert_eq!(id.as_str().len(), 17);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh id from the tail of a random v4 UUID.
    #[must_use]
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        let suffix = &hex[hex.len() - SESSION_SUFFIX_LEN..];
        Self(format!("{SESSION_PREFIX}{suffix}"))
    }

    /// Wraps an existing id, e.g. one read back from storage.
    #[must_use]
    pub fn from_existing(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks if the id is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
