//! HTTP exchange seam. [`HttpTransport`] is the production implementation;
//! tests substitute scripted transports.

use crate::error::{ClientError, TransportError};
use async_trait::async_trait;
use core_logic::ClientConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: serde_json::Value,
    pub timeout: Duration,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `request.body` as JSON and returns the raw status and body.
    async fn post(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;

    /// Releases pooled connections. Later requests fail with [`TransportError::Closed`].
    fn close(&self);
}

/// Keep-alive `reqwest` client.
///
/// TLS certificate verification is disabled: the game service presents a
/// certificate that does not chain to a public CA. This trades server
/// authenticity for reachability of that one host.
pub struct HttpTransport {
    client: Mutex<Option<reqwest::Client>>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        warn!(
            "TLS certificate verification disabled for {}",
            config.base_url()
        );

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(config.request_timeout())
            .connect_timeout(config.request_timeout())
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(config.max_workers)
            .build()?;

        Ok(Self {
            client: Mutex::new(Some(client)),
        })
    }

    fn client(&self) -> Option<reqwest::Client> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn header_map(headers: &[(&'static str, String)]) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::Other(format!("invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::Other(format!("invalid header {}: {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let client = self.client().ok_or(TransportError::Closed)?;
        let headers = header_map(&request.headers)?;

        let response = client
            .post(&request.url)
            .headers(headers)
            .json(&request.body)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify_reqwest_error)?;
        Ok(ApiResponse { status, body })
    }

    fn close(&self) {
        if self
            .client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
        {
            debug!("HTTP connection pool released");
        }
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Other(e.to_string())
    }
}
