//! Transport error types

use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur before a response status is available.
///
/// Anything carrying an HTTP status is not a transport error; it is returned
/// as an [`HttpResponse`](crate::HttpResponse) and classified by the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server could not be reached (DNS, refused, reset).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The exchange did not complete in time.
    #[error("Timeout")]
    Timeout,

    /// The request could not be expressed on the wire.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP-level failure after the connection was established.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Body serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TransportError {
    /// Whether the remote side was never reached.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
