//! API resource endpoints
//!
//! Thin, stateless wrappers over the REST surface, organized by resource.
//! Session bookkeeping lives in [`crate::session`] and collection state in
//! [`crate::repository`]; these types only build requests and map responses.

pub mod auth;
pub mod skills;

pub use auth::Auth;
pub use skills::{ReportReceipt, Skills};
