//! Endpoint request builder

use http::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use skillfolio_transport::HttpRequest;
use url::Url;

use crate::error::{Error, Result};

/// One API call, expressed relative to the base URL.
#[derive(Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Vec<u8>>,
    bearer: Option<SecretString>,
}

impl ApiRequest {
    /// Create a new request for `path` (e.g. `/skills/4`).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer: None,
        }
    }

    /// `GET path`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST path`
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT path`
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `DELETE path`
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Serialize `body` as the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Attach the session token.
    pub fn bearer(mut self, token: &SecretString) -> Self {
        self.bearer = Some(token.clone());
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Serialized body size, if any.
    pub fn body_size(&self) -> Option<usize> {
        self.body.as_ref().map(Vec::len)
    }

    /// Whether a token is attached.
    pub fn is_authenticated(&self) -> bool {
        self.bearer.is_some()
    }

    /// Resolve against `base` and produce the transport record.
    ///
    /// The base URL's own path (such as `/api`) is kept: `/skills` under
    /// `http://host/api` becomes `http://host/api/skills`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the joined URL does not parse.
    pub fn into_http(self, base: &Url, default_headers: &http::HeaderMap) -> Result<HttpRequest> {
        let url = endpoint_url(base, &self.path)?;
        let mut request = HttpRequest::new(self.method.as_str(), url.as_str())
            .with_header("Accept", "application/json");

        for (key, value) in default_headers {
            if let Ok(value) = value.to_str() {
                request = request.with_header(key.as_str(), value);
            }
        }

        if let Some(token) = &self.bearer {
            request = request.with_bearer(token.expose_secret());
        }

        if let Some(body) = self.body {
            request = request
                .with_header("Content-Type", "application/json")
                .with_body(body);
        }

        Ok(request)
    }
}

impl std::fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("body_size", &self.body_size())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

fn endpoint_url(base: &Url, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    joined
        .parse()
        .map_err(|e| Error::InvalidUrl(format!("Failed to construct URL for '{}': {}", path, e)))
}
