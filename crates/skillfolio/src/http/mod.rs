//! HTTP request/response plumbing between the core and a [`Transport`]
//!
//! [`ApiRequest`] describes one endpoint call relative to the configured
//! base URL; [`ResponseExt`] turns a raw [`HttpResponse`] into either a
//! parsed value or an [`Error`](crate::Error) from the taxonomy.
//!
//! [`Transport`]: skillfolio_transport::Transport

pub use request::ApiRequest;
pub use response::ResponseExt;

mod request;
mod response;

// Re-export HTTP types from the http crate for convenience
pub use http::Method;
pub use skillfolio_transport::{HttpRequest, HttpResponse};
