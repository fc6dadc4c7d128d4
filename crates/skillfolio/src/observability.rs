//! Centralized observability utilities for structured logging
//!
//! All API requests/responses are logged through this layer so that the
//! field names stay consistent across the session store and the repository.
//! The library never installs a subscriber itself; applications either
//! bring their own or enable the `trace` feature and call [`init_tracing`].

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// HTTP request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path relative to the base URL
    pub path: String,
    /// Request body size in bytes (optional)
    pub body_size: Option<usize>,
    /// Whether a bearer token was attached
    pub authenticated: bool,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body_size: None,
            authenticated: false,
        }
    }

    /// Set the request body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Mark the request as carrying a bearer token
    pub fn authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    /// Log request being sent
    pub fn log_request(&self) {
        debug!(
            method = %self.method,
            path = %self.path,
            body_size = self.body_size,
            authenticated = self.authenticated,
            "Sending API request"
        );
    }

    /// Log a transport-level failure (no status available)
    pub fn log_unreachable(&self, elapsed: Duration, error: &str) {
        warn!(
            method = %self.method,
            path = %self.path,
            elapsed_ms = elapsed.as_millis(),
            error = %error,
            "API request could not reach the server"
        );
    }
}

/// HTTP response metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code
    pub status: u16,
    /// Response body size in bytes (optional)
    pub body_size: Option<usize>,
    /// Time elapsed for the request
    pub elapsed: Duration,
}

impl ResponseMetadata {
    /// Create new response metadata
    pub fn new(status: u16, elapsed: Duration) -> Self {
        Self {
            status,
            body_size: None,
            elapsed,
        }
    }

    /// Set the response body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log successful response
    pub fn log_success(&self, request: &RequestMetadata) {
        info!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            body_size = self.body_size,
            "API request succeeded"
        );
    }

    /// Log failed response
    pub fn log_error(&self, request: &RequestMetadata, error: &str) {
        warn!(
            method = %request.method,
            path = %request.path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            error = %error,
            "API request failed"
        );
    }
}

/// Timer for measuring request duration
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Log a response that was dropped because its session has ended
pub fn log_discarded(operation: &str, issued_epoch: u64, current_epoch: u64) {
    debug!(
        operation = %operation,
        issued_epoch,
        current_epoch,
        "Discarding response from an ended session"
    );
}

/// Log a client-side validation failure
pub fn log_validation_error(field: &str, reason: &str) {
    debug!(
        field = %field,
        reason = %reason,
        "Request validation failed"
    );
}

/// Install a global `tracing` subscriber filtered by `RUST_LOG`
/// (defaulting to `skillfolio=info`).
///
/// Calling it more than once is harmless; later calls are ignored.
#[cfg(feature = "trace")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skillfolio=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_metadata_creation() {
        let metadata = RequestMetadata::new("POST", "/skills");
        assert_eq!(metadata.method, "POST");
        assert_eq!(metadata.path, "/skills");
        assert_eq!(metadata.body_size, None);
        assert!(!metadata.authenticated);
    }

    #[test]
    fn test_request_metadata_builders() {
        let metadata = RequestMetadata::new("PUT", "/skills/4")
            .with_body_size(64)
            .authenticated(true);
        assert_eq!(metadata.body_size, Some(64));
        assert!(metadata.authenticated);
    }

    #[test]
    fn test_response_metadata_creation() {
        let elapsed = Duration::from_millis(120);
        let metadata = ResponseMetadata::new(204, elapsed).with_body_size(0);
        assert_eq!(metadata.status, 204);
        assert_eq!(metadata.elapsed, elapsed);
        assert_eq!(metadata.body_size, Some(0));
    }

    #[test]
    fn test_request_timer() {
        let timer = RequestTimer::start();
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed().as_millis() >= 10);
    }

    #[test]
    fn test_logging_does_not_panic_with_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let request = RequestMetadata::new("GET", "/skills");
            request.log_request();
            ResponseMetadata::new(200, Duration::from_millis(3)).log_success(&request);
            ResponseMetadata::new(500, Duration::from_millis(3)).log_error(&request, "boom");
            request.log_unreachable(Duration::from_millis(3), "refused");
            log_discarded("list", 1, 2);
            log_validation_error("name", "must not be empty");
        });
    }
}
