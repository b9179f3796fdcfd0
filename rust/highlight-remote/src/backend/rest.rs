//! REST backend for the recognition service

use std::time::Duration;

use async_trait::async_trait;
use highlight_spans::{RecognitionRequest, RecognitionResponse};
use reqwest::Client;
use tracing::{debug, trace};

use super::RecognitionBackend;
use crate::error::RecognitionError;

/// Default location of the recognition endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api/chat/recognize-entities";

/// How the recognition service expects callers to identify themselves.
#[derive(Clone, Debug)]
pub enum AuthMethod {
    /// Anonymous access, e.g. a service on localhost
    None,

    /// Sent as `Authorization: Bearer {token}` on every recognition request
    Bearer(String),
}

/// Where and how to reach the recognition service.
#[derive(Clone, Debug)]
pub struct RestBackendConfig {
    /// URL that recognition requests are POSTed to
    pub endpoint: String,

    pub auth_method: AuthMethod,

    /// Wall-clock budget per attempt in seconds (default: 30). An attempt
    /// that runs over fails with a retryable transport error.
    pub timeout_seconds: Option<u64>,

    /// Extra headers attached to every recognition request
    pub headers: Vec<(String, String)>,
}

impl Default for RestBackendConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auth_method: AuthMethod::None,
            timeout_seconds: Some(30),
            headers: Vec::new(),
        }
    }
}

impl RestBackendConfig {
    /// Target a recognition endpoint other than the local default
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_auth(mut self, auth_method: AuthMethod) -> Self {
        self.auth_method = auth_method;
        self
    }

    /// Per-attempt timeout in seconds
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// Recognition backend speaking JSON over HTTP.
///
/// Issues `POST {endpoint}` with a body of
/// `{ "text": ..., "options": { "fuzzy_matching": ..., "confidence_threshold": ... } }`
/// and expects a `RecognitionResponse` body. Requests that exceed the
/// configured timeout fail with a retryable transport error.
///
/// # Examples
///
/// ```no_run
/// use highlight_remote::backend::{AuthMethod, RecognitionBackend, RestBackend, RestBackendConfig};
/// use highlight_spans::RecognitionRequest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RestBackendConfig::new("https://api.example.com/api/chat/recognize-entities")
///     .with_auth(AuthMethod::Bearer("my-token".to_string()))
///     .with_timeout(10);
///
/// let backend = RestBackend::new(config)?;
/// let response = backend
///     .recognize(&RecognitionRequest::new("Show me Cadbury revenue"))
///     .await?;
///
/// println!("{} entities", response.entities.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RestBackend {
    config: RestBackendConfig,
    client: Client,
}

impl RestBackend {
    /// Build the HTTP client for `config`. Fails when the client cannot be
    /// constructed, rather than falling back to one without a timeout.
    pub fn new(config: RestBackendConfig) -> Result<Self, RecognitionError> {
        let mut client = Client::builder();

        if let Some(timeout) = config.timeout_seconds {
            client = client.timeout(Duration::from_secs(timeout));
        }

        let client = client.build().map_err(|error| {
            RecognitionError::transport(format!("Unable to build HTTP client: {error}"))
        })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &RestBackendConfig {
        &self.config
    }

    fn authorize(&self, mut request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let AuthMethod::Bearer(token) = &self.config.auth_method {
            request = request.bearer_auth(token);
        }

        self.config
            .headers
            .iter()
            .fold(request, |request, (key, value)| request.header(key, value))
    }
}

#[async_trait]
impl RecognitionBackend for RestBackend {
    async fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<RecognitionResponse, RecognitionError> {
        let outgoing = self.authorize(self.client.post(&self.config.endpoint).json(request));

        trace!(endpoint = %self.config.endpoint, "Sending recognition request");
        let response = outgoing.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Recognition request failed");

            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("Unknown").to_string()
            } else {
                body
            };
            return Err(RecognitionError::from_status(status.as_u16(), message));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|error| RecognitionError::server(format!("Malformed response body: {error}")))
    }
}
