//! Storage trait definition.
//!
//! Defines the interface for durable client state, enabling pluggable
//! storage implementations.

use crate::error::Result;

/// Trait for durable client-state backends.
///
/// State is a flat map from fixed keys to JSON documents. Each key is
/// written independently, so one record can be saved without touching the
/// others.
pub trait StateStore: Send {
    /// Initializes storage (creates the schema on first use).
    ///
    /// Should be idempotent - safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails or the stored schema is
    /// newer than this build understands.
    fn init(&mut self) -> Result<()>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get(&self, key: &str) -> Result<Option<String>>;
}
