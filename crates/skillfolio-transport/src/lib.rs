//! Request/response transport abstraction for the Skillfolio client core
//!
//! The core never talks to a socket directly. It builds an [`HttpRequest`]
//! (method, URL, headers, optional already-serialized body) and hands it to
//! a [`Transport`], which answers with an [`HttpResponse`] or a
//! [`TransportError`] when the server could not be reached at all.
//!
//! # Architecture
//!
//! - **Transport trait**: generic interface for any transport implementation
//! - **HTTP transport**: `reqwest`-backed implementation used in production
//! - **Error handling**: transport failures are kept apart from HTTP statuses;
//!   a 4xx/5xx is a successful exchange carrying an error status
//!
//! # Usage
//!
//! ```ignore
//! use skillfolio_transport::{HttpRequest, HttpTransport, Transport};
//!
//! let transport = HttpTransport::new()?;
//! let request = HttpRequest::new("GET", "http://localhost:5000/api/skills")
//!     .with_bearer("token");
//! let response = transport.send_http(request).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod traits;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use http::{HttpTransport, HttpTransportConfig};
pub use traits::{HttpRequest, HttpResponse, Transport};
