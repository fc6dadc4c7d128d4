//! Main client implementation for the Skillfolio API

use std::sync::Arc;

use skillfolio_transport::{HttpResponse, HttpTransport, HttpTransportConfig, Transport};
use url::Url;

use crate::{
    config::ClientConfig,
    error::{Error, Result},
    http::{ApiRequest, ResponseExt},
    observability::{RequestMetadata, RequestTimer, ResponseMetadata},
    resources::{Auth, Skills},
    session::{FileTokenStore, MemoryTokenStore, SessionStore, TokenStore},
};

/// Stateless access to the Skillfolio API.
///
/// The client owns the transport and the resolved base URL. It holds no
/// session state; [`SessionStore`] and
/// [`SkillRepository`](crate::repository::SkillRepository) build on top of it.
///
/// # Example
///
/// ```rust,no_run
/// use skillfolio::SkillfolioClient;
///
/// # fn example() -> skillfolio::Result<()> {
/// let client = SkillfolioClient::builder()
///     .base_url("http://localhost:5000/api")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SkillfolioClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    /// Transport performing the actual exchanges
    transport: Arc<dyn Transport>,
    /// Parsed base URL
    base_url: Url,
    /// Configuration the client was built from
    config: ClientConfig,
}

impl SkillfolioClient {
    /// Create a builder for configuring a client.
    pub fn builder() -> SkillfolioClientBuilder {
        SkillfolioClientBuilder::default()
    }

    /// Create a client from a configuration object, using the HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be created.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(HttpTransportConfig {
            timeout: config.timeout,
            connect_timeout: config.connect_timeout,
            ..Default::default()
        })
        .map_err(|e| Error::Config(format!("failed to create HTTP transport: {e}")))?;

        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over a caller-supplied transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let base_url = config.parsed_base_url()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                base_url,
                config,
            }),
        })
    }

    /// Access the auth endpoints.
    pub fn auth(&self) -> Auth {
        Auth::new(self.clone())
    }

    /// Access the skills endpoints.
    pub fn skills(&self) -> Skills {
        Skills::new(self.clone())
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get the base URL for the API
    pub fn base_url(&self) -> &str {
        self.inner.base_url.as_str()
    }

    /// Token store described by the configuration: a file when
    /// `token_path` is set, memory otherwise.
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        match &self.inner.config.token_path {
            Some(path) => Arc::new(FileTokenStore::new(path.clone())),
            None => Arc::new(MemoryTokenStore::new()),
        }
    }

    /// Create a session store using the configured token store.
    pub fn session(&self) -> Arc<SessionStore> {
        Arc::new(SessionStore::new(self.clone(), self.token_store()))
    }

    /// Send a request and return the raw response, whatever its status.
    pub(crate) async fn execute(&self, request: ApiRequest) -> Result<HttpResponse> {
        let mut metadata = RequestMetadata::new(request.method().as_str(), request.path())
            .authenticated(request.is_authenticated());
        if let Some(size) = request.body_size() {
            metadata = metadata.with_body_size(size);
        }
        metadata.log_request();

        let http_request = request.into_http(&self.inner.base_url, &self.inner.config.default_headers)?;
        let timer = RequestTimer::start();

        match self.inner.transport.send_http(http_request).await {
            Ok(response) => {
                let response_metadata = ResponseMetadata::new(response.status, timer.elapsed())
                    .with_body_size(response.body.len());
                if response.is_success() {
                    response_metadata.log_success(&metadata);
                } else {
                    response_metadata.log_error(&metadata, &response.text());
                }
                Ok(response)
            }
            Err(err) => {
                metadata.log_unreachable(timer.elapsed(), &err.to_string());
                Err(err.into())
            }
        }
    }

    /// Send a request and parse a JSON body from a successful response.
    pub(crate) async fn send<T: serde::de::DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.execute(request).await?.parse_result()
    }

    /// Send a request whose successful response carries no body of interest.
    pub(crate) async fn send_empty(&self, request: ApiRequest) -> Result<()> {
        self.execute(request).await?.error_for_status().map(|_| ())
    }
}

impl std::fmt::Debug for SkillfolioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillfolioClient")
            .field("base_url", &self.base_url())
            .finish_non_exhaustive()
    }
}

/// Builder for creating a configured client.
#[derive(Default)]
pub struct SkillfolioClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl SkillfolioClientBuilder {
    /// Start from an existing configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the base URL for the API.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the recently-updated bound for derived summaries.
    pub fn recent_limit(mut self, limit: usize) -> Self {
        self.config.recent_limit = limit;
        self
    }

    /// Persist the session token in `path`.
    pub fn token_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.config.token_path = Some(path.into());
        self
    }

    /// Use a specific transport instead of the HTTP one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be created.
    pub fn build(self) -> Result<SkillfolioClient> {
        match self.transport {
            Some(transport) => SkillfolioClient::with_transport(self.config, transport),
            None => SkillfolioClient::from_config(self.config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedTransport;

    #[test]
    fn test_builder_defaults() {
        let client = SkillfolioClient::builder().build().unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(client.config().recent_limit, 5);
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        let result = SkillfolioClient::builder().base_url("ftp://nope").build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_send_maps_status() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(404, serde_json::json!({"message": "gone"}));

        let client = SkillfolioClient::builder()
            .transport(transport.clone())
            .build()
            .unwrap();

        let err = client
            .send::<serde_json::Value>(ApiRequest::get("/skills/1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "http://localhost:5000/api/skills/1");
    }

    #[tokio::test]
    async fn test_unreachable_is_network_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_unreachable();

        let client = SkillfolioClient::builder().transport(transport).build().unwrap();
        let err = client.send_empty(ApiRequest::delete("/skills/1")).await.unwrap_err();
        assert!(err.is_network());
    }

    #[test]
    fn test_token_store_follows_config() {
        let dir = tempfile::tempdir().unwrap();
        let client = SkillfolioClient::builder()
            .token_path(dir.path().join("token"))
            .build()
            .unwrap();
        let store = client.token_store();
        store
            .save(&secrecy::SecretString::new("abc".to_string().into_boxed_str()))
            .unwrap();
        assert!(dir.path().join("token").exists());
    }
}
