//! HTTP transport seam
//!
//! Both the spec loader and the request executor talk to the network only
//! through [`HttpTransport`], so tests and embedders can swap the I/O.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::error::{ExplorerError, Result};
use crate::settings::Settings;
use crate::types::PreparedRequest;

/// Raw response handed back by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Canonical reason phrase, empty when unknown
    pub status_text: String,
    /// Headers in wire order
    pub headers: Vec<(String, String)>,
    /// Full body as text
    pub body: String,
}

impl TransportResponse {
    /// Status in 200..=299
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network-level failure: no HTTP response was obtained
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to read response: {0}")]
    Body(String),

    #[error("{0}")]
    Other(String),
}

impl From<TransportError> for ExplorerError {
    fn from(err: TransportError) -> Self {
        ExplorerError::Transport(err.to_string())
    }
}

/// Capability that performs HTTP calls
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and read the whole body as text
    async fn send(&self, request: &PreparedRequest) -> std::result::Result<TransportResponse, TransportError>;

    /// Get a human-readable name for this transport
    fn transport_name(&self) -> &'static str;
}

/// Production transport backed by reqwest
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with an optional per-request timeout
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ExplorerError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Create a transport honoring the configured timeout
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.request_timeout())
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn classify(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> std::result::Result<TransportResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", request.method, e)))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(Self::classify)?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        debug!("{} {} -> {}", request.method, request.url, status);

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }

    fn transport_name(&self) -> &'static str {
        "reqwest"
    }
}
