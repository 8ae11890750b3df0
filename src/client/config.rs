//! Service endpoint configuration.

use crate::core::SessionId;
use crate::error::{Result, TransportError};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Default base URL of the RAG services.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5096/";

/// Placeholder in [`ServiceConfig::reset_path`] replaced by the session id.
pub const SESSION_PLACEHOLDER: &str = "{sessionId}";

/// Where the split, load, query and reset endpoints live.
///
/// Paths are relative to `base_url`.
///
/// # Examples
///
/// ```
/// use ragflow::client::ServiceConfig;
///
/// let config = ServiceConfig::default();
/// let url = config.split_url().unwrap();
/// assert_eq!(url.as_str(), "http://localhost:5096/api/v1/content/split");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL all paths are resolved against.
    pub base_url: String,
    /// Splitting endpoint.
    pub split_path: String,
    /// Document loading endpoint.
    pub load_path: String,
    /// RAG query endpoint.
    pub query_path: String,
    /// Session reset endpoint, containing [`SESSION_PLACEHOLDER`].
    pub reset_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            split_path: "api/v1/content/split".to_string(),
            load_path: "api/v1/content/load".to_string(),
            query_path: "api/v1/rag/query".to_string(),
            reset_path: format!("api/v1/rag/reset/{SESSION_PLACEHOLDER}"),
        }
    }
}

impl ServiceConfig {
    /// Default endpoints under a different base URL.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Resolves `path` against the base URL.
    ///
    /// A missing trailing slash on the base URL is tolerated.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute http(s) URL.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        let mut base = self.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                self.base_url,
                base.scheme()
            ))
            .into());
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidUrl(format!("{path}: {e}")).into())
    }

    /// URL of the splitting endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built.
    pub fn split_url(&self) -> Result<Url> {
        self.resolve(&self.split_path)
    }

    /// URL of the document loading endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built.
    pub fn load_url(&self) -> Result<Url> {
        self.resolve(&self.load_path)
    }

    /// URL of the query endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built.
    pub fn query_url(&self) -> Result<Url> {
        self.resolve(&self.query_path)
    }

    /// URL of the reset endpoint for `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built.
    pub fn reset_url(&self, session: &SessionId) -> Result<Url> {
        let path = self
            .reset_path
            .replace(SESSION_PLACEHOLDER, session.as_str());
        self.resolve(&path)
    }
}
