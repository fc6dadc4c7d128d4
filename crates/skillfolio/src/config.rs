//! Configuration for the Skillfolio client

use http::HeaderMap;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Default API base URL (path prefix included)
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Default number of entries in a summary's recently-updated list
pub const DEFAULT_RECENT_LIMIT: usize = 5;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the Skillfolio client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the API, including any path prefix such as `/api`
    pub base_url: String,

    /// Timeout for a single request/response exchange
    pub timeout: Duration,

    /// Timeout for establishing a connection
    pub connect_timeout: Duration,

    /// Bound on the recently-updated list of a derived summary
    pub recent_limit: usize,

    /// File used to persist the session token between runs.
    /// `None` keeps the token in memory only.
    pub token_path: Option<PathBuf>,

    /// Custom headers to include with every request
    pub default_headers: HeaderMap,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            recent_limit: DEFAULT_RECENT_LIMIT,
            token_path: None,
            default_headers: HeaderMap::new(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration pointing at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Start a fluent builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first, if present.
    /// This will look for:
    /// - `SKILLFOLIO_BASE_URL` for the API base URL
    /// - `SKILLFOLIO_TIMEOUT` for request timeout (in seconds)
    /// - `SKILLFOLIO_CONNECT_TIMEOUT` for connect timeout (in seconds)
    /// - `SKILLFOLIO_RECENT_LIMIT` for the recently-updated bound
    /// - `SKILLFOLIO_TOKEN_PATH` for the persisted token file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a numeric variable does not parse.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        use std::env;

        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Ok(base_url) = env::var("SKILLFOLIO_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(timeout) = env::var("SKILLFOLIO_TIMEOUT") {
            config.timeout = Duration::from_secs(parse_var("SKILLFOLIO_TIMEOUT", &timeout)?);
        }

        if let Ok(timeout) = env::var("SKILLFOLIO_CONNECT_TIMEOUT") {
            config.connect_timeout =
                Duration::from_secs(parse_var("SKILLFOLIO_CONNECT_TIMEOUT", &timeout)?);
        }

        if let Ok(limit) = env::var("SKILLFOLIO_RECENT_LIMIT") {
            config.recent_limit = parse_var("SKILLFOLIO_RECENT_LIMIT", &limit)?;
        }

        if let Ok(path) = env::var("SKILLFOLIO_TOKEN_PATH") {
            config.token_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Merge this configuration with another, with the other taking precedence
    /// wherever it differs from the defaults.
    pub fn merge(mut self, other: ClientConfig) -> Self {
        if other.base_url != DEFAULT_BASE_URL {
            self.base_url = other.base_url;
        }
        if other.timeout != DEFAULT_TIMEOUT {
            self.timeout = other.timeout;
        }
        if other.connect_timeout != DEFAULT_CONNECT_TIMEOUT {
            self.connect_timeout = other.connect_timeout;
        }
        if other.recent_limit != DEFAULT_RECENT_LIMIT {
            self.recent_limit = other.recent_limit;
        }
        if other.token_path.is_some() {
            self.token_path = other.token_path;
        }
        for (key, value) in other.default_headers.iter() {
            self.default_headers.insert(key.clone(), value.clone());
        }

        self
    }

    /// Parse and check the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] for empty, unparsable, or non-HTTP URLs.
    pub fn parsed_base_url(&self) -> Result<Url> {
        if self.base_url.trim().is_empty() {
            return Err(Error::InvalidUrl("Base URL cannot be empty".to_string()));
        }

        let url: Url = self
            .base_url
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::InvalidUrl(format!(
                "Invalid URL scheme '{}'. Only 'http' and 'https' are supported.",
                scheme
            ))),
        }
    }
}

#[cfg(feature = "env")]
fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{name} must be a non-negative integer, got '{value}'")))
}

/// Builder for creating ClientConfig with a fluent API.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the recently-updated bound.
    pub fn recent_limit(mut self, limit: usize) -> Self {
        self.config.recent_limit = limit;
        self
    }

    /// Persist the session token in `path`.
    pub fn token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.token_path = Some(path.into());
        self
    }

    /// Add a default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid according to HTTP specifications.
    pub fn default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self> {
        let key_str = key.into();
        let value_str = value.into();

        let key: http::HeaderName = key_str
            .parse()
            .map_err(|_| Error::Config(format!("Invalid header name: {key_str}")))?;
        let value: http::HeaderValue = value_str
            .parse()
            .map_err(|_| Error::Config(format!("Invalid header value: {value_str}")))?;

        self.config.default_headers.insert(key, value);
        Ok(self)
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
