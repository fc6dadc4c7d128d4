//! HTTP transport client implementation
//!
//! Implements the Transport trait on top of `reqwest` with connection
//! pooling and timeout handling. One call is one exchange.

use crate::error::{Result, TransportError};
use crate::traits::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// HTTP transport implementation
///
/// Handles HTTP requests with:
/// - Connection pooling
/// - Request and connect timeouts
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Arc<ReqwestClient>,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a new HTTP transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a new HTTP transport with custom configuration
    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            timeout: config.timeout,
        })
    }

    /// Get a reference to the underlying reqwest client
    pub fn reqwest_client(&self) -> Arc<ReqwestClient> {
        self.client.clone()
    }

    /// Request timeout applied to every exchange
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_http(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.to_uppercase().as_bytes())
            .map_err(|_| {
                TransportError::InvalidRequest(format!(
                    "Unsupported HTTP method: {}",
                    request.method
                ))
            })?;

        let mut req = self.client.request(method, &request.url);

        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        let response = req.send().await?;

        let status = response.status().as_u16();
        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let body = response.bytes().await?.to_vec();
        trace!(status, body_size = body.len(), "transport exchange complete");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// HTTP transport configuration
#[derive(Clone, Debug)]
pub struct HttpTransportConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// User-Agent header value
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 10,
            user_agent: format!("skillfolio-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
