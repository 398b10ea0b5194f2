//! HTTP client implementation.

use crate::request::AnalyzeRequest;
use crate::response::{AnalyzeResponse, HealthStatus};
use crate::transport::AnalysisTransport;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default analysis endpoint of the local service.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/analyze_url";

/// HTTP client errors.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Timeout")]
    Timeout,
    #[error("Request error: {0}")]
    Request(String),
    #[error("Unexpected status: {0}")]
    Status(u16),
    #[error("Response error: {0}")]
    Response(String),
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else {
            ClientError::Request(err.to_string())
        }
    }
}

/// Client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Analysis endpoint, e.g. `http://127.0.0.1:5000/analyze_url`.
    pub endpoint: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(3),
            connect_timeout: Duration::from_secs(1),
            user_agent: format!("PrivacyGuard/{} ({})", env!("CARGO_PKG_VERSION"), std::env::consts::OS),
        }
    }
}

/// HTTP client talking to the analysis service.
pub struct HttpClient {
    /// Inner reqwest client.
    inner: reqwest::Client,
    endpoint: Url,
    config: ClientConfig,
}

impl HttpClient {
    /// Create a client for the default local endpoint.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.endpoint, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ClientError::Request(e.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| ClientError::Request(e.to_string()))?;

        Ok(Self {
            inner,
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Health endpoint on the same origin as the analysis endpoint.
    pub fn health_url(&self) -> Result<Url, ClientError> {
        self.endpoint
            .join("/health")
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    /// Get client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Response(e.to_string()))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl AnalysisTransport for HttpClient {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, url = %request.url, "Submitting analysis request");
        let response = self
            .inner
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = self.health_url()?;
        let response = self.inner.get(url).send().await?;
        Self::read_json(response).await
    }
}

/// HTTP client builder.
pub struct HttpClientBuilder {
    config: ClientConfig,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the analysis endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpClient, ClientError> {
        HttpClient::with_config(self.config)
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
