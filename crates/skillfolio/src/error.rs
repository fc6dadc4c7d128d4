//! Error types for the Skillfolio client
//!
//! Every failure the core can report is one variant of [`Error`]. The
//! variants fall into three groups that callers are expected to tell apart:
//!
//! - the server could not be reached ([`Error::Network`]),
//! - the server answered and refused ([`Error::Authentication`],
//!   [`Error::Validation`], [`Error::NotFound`], [`Error::Server`], ...),
//! - the request never left the process ([`Error::InvalidRequest`],
//!   [`Error::NotAuthenticated`], [`Error::SessionEnded`], ...).

use skillfolio_transport::TransportError;
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias for operations that can fail with a Skillfolio error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Skillfolio client.
#[derive(Debug, Error)]
pub enum Error {
    /// The server could not be reached (refused, DNS, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// Credentials were rejected or the token is invalid/expired (401).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The token is valid but the action is not permitted (403).
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// The addressed resource does not exist (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The request conflicts with server state (409).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The server rejected the input (400/422).
    #[error("Validation failed: {message}")]
    Validation {
        /// Summary message from the server
        message: String,
        /// Field-level problems, if the server listed them
        errors: Vec<FieldError>,
    },

    /// The server failed while handling the request (5xx).
    #[error("Server error (status {status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Any other unexpected HTTP status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// The request was rejected locally before anything was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A protected operation was attempted without a session token.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The response belonged to a session that has since ended and was discarded.
    #[error("Session ended before the response arrived")]
    SessionEnded,

    /// The persisted token slot could not be read or written.
    #[error("Token store error: {0}")]
    TokenStore(String),

    /// Failed to serialize a request or deserialize a response.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A single field-level validation problem reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,
    /// Validation error message
    pub message: String,
}

impl Error {
    /// Create an error from a non-success HTTP status and its body.
    ///
    /// The body may be a problem-details document
    /// (`{"title": .., "errors": {"Name": [..]}}`), a `{"message": ..}`
    /// object, or plain text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok();
        let message = parsed
            .as_ref()
            .and_then(ErrorBody::message)
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| default_message(status).to_string());

        match status {
            400 | 422 => Error::Validation {
                message,
                errors: parsed.map(ErrorBody::field_errors).unwrap_or_default(),
            },
            401 => Error::Authentication(message),
            403 => Error::Forbidden(message),
            404 => Error::NotFound(message),
            409 => Error::Conflict(message),
            s if s >= 500 => Error::Server { status, message },
            _ => Error::Api { status, message },
        }
    }

    /// The server could not be reached at all.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    /// The server answered but refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::Authentication(_)
                | Error::Forbidden(_)
                | Error::NotFound(_)
                | Error::Conflict(_)
                | Error::Validation { .. }
                | Error::Server { .. }
                | Error::Api { .. }
        )
    }

    /// The failure is about credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Authentication(_) | Error::NotAuthenticated)
    }

    /// Whether re-invoking the same call could plausibly succeed.
    ///
    /// Advisory only. The client never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Server { .. })
    }

    /// HTTP status behind this error, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Authentication(_) => Some(401),
            Error::Forbidden(_) => Some(403),
            Error::NotFound(_) => Some(404),
            Error::Conflict(_) => Some(409),
            Error::Server { status, .. } | Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connection(msg) | TransportError::Http(msg) => Error::Network(msg),
            TransportError::Timeout => Error::Network("request timed out".to_string()),
            TransportError::InvalidRequest(msg) | TransportError::Serialization(msg) => {
                Error::InvalidRequest(msg)
            }
        }
    }
}

fn default_message(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unexpected response")
}

// Helper structures for parsing API error bodies

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorBody {
    fn message(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.detail.clone())
            .or_else(|| self.title.clone())
    }

    fn field_errors(self) -> Vec<FieldError> {
        self.errors
            .unwrap_or_default()
            .into_iter()
            .flat_map(|(field, messages)| {
                messages.into_iter().map(move |message| FieldError {
                    field: field.clone(),
                    message,
                })
            })
            .collect()
    }
}
