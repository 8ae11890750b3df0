//! HTTP implementation of the RAG services.

use crate::Result;
use crate::client::{
    LoadRequest, LoadResponse, QueryRequest, QueryResponse, RagService, ServiceConfig,
    SplitRequest,
};
use crate::core::{MemoryChunk, SessionId};
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Talks to the RAG services over HTTP with JSON bodies.
///
/// No client-side timeout is configured; requests rely on the transport's
/// own behavior.
///
/// # Examples
///
/// ```
/// use ragflow::client::{HttpRagService, ServiceConfig};
///
/// let service = HttpRagService::new(ServiceConfig::default());
/// assert_eq!(service.config().base_url, "http://localhost:5096/");
/// ```
pub struct HttpRagService {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl HttpRagService {
    /// Creates a service client with a default `reqwest` client.
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates a service client reusing an existing `reqwest` client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client, config: ServiceConfig) -> Self {
        Self { client, config }
    }

    /// Returns the endpoint configuration.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// POSTs `body` as JSON and decodes the JSON response.
    async fn post_json<B, R>(&self, url: Url, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        debug!(%url, "POST");
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(TransportError::from)?;

        let response = check_status(&url, response)?;
        response.json::<R>().await.map_err(|e| {
            TransportError::Decode {
                endpoint: url.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Turns a non-success status into a transport error.
fn check_status(url: &Url, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(TransportError::Status {
            endpoint: url.to_string(),
            status: status.as_u16(),
        }
        .into())
    }
}

#[async_trait]
impl RagService for HttpRagService {
    async fn split(&self, request: &SplitRequest) -> Result<Vec<MemoryChunk>> {
        let url = self.config.split_url()?;
        self.post_json(url, request).await
    }

    async fn load(&self, request: &LoadRequest) -> Result<LoadResponse> {
        let url = self.config.load_url()?;
        self.post_json(url, request).await
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let url = self.config.query_url()?;
        self.post_json(url, request).await
    }

    async fn reset(&self, session: &SessionId) -> Result<()> {
        let url = self.config.reset_url(session)?;
        debug!(%url, "DELETE");
        let response = self
            .client
            .delete(url.clone())
            .send()
            .await
            .map_err(TransportError::from)?;
        // The body is ignored; only the status matters
        check_status(&url, response)?;
        Ok(())
    }
}
