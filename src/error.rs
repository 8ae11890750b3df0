//! Error types for ragflow operations.
//!
//! This module provides the error hierarchy using `thiserror` for remote
//! service calls, persisted client state, CLI commands and file I/O.

use thiserror::Error;

/// Result type alias for ragflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for ragflow operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Remote service errors (split, load, query, reset).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Persisted client state errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Invalid state errors.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state.
        message: String,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Errors raised while talking to the remote services.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("request to {endpoint} failed: {reason}")]
    Request {
        /// Endpoint URL.
        endpoint: String,
        /// Underlying reason.
        reason: String,
    },

    /// The service answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        /// Endpoint URL.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("invalid response from {endpoint}: {reason}")]
    Decode {
        /// Endpoint URL.
        endpoint: String,
        /// Underlying reason.
        reason: String,
    },

    /// An endpoint URL could not be built from the configuration.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// Generic transport failure.
    #[error("{0}")]
    Other(String),
}

/// Storage-specific errors for the persisted client state.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(String),

    /// The database schema is not one this build can use.
    #[error("schema error: {0}")]
    Schema(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Directory creation error.
    #[error("failed to create directory: {path}: {reason}")]
    DirectoryFailed {
        /// Path to the directory.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Unknown command.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),
}

// Implement From traits for library errors

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Database(err.to_string()))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map_or_else(|| "<unknown>".to_string(), ToString::to_string);
        if let Some(status) = err.status() {
            Self::Status {
                endpoint,
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            Self::Decode {
                endpoint,
                reason: err.to_string(),
            }
        } else {
            Self::Request {
                endpoint,
                reason: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.into())
    }
}
