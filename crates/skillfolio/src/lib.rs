//! # Skillfolio
//!
//! Client-side core for the Skillfolio skills tracker:
//! - Session lifecycle (restore, login, register, logout) with a durable token slot
//! - A skill repository that stays consistent when responses race each other
//! - Summaries derived from the held collection, or taken from the server
//! - Filtering without going back to the server
//! - A single create-or-edit session at a time
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skillfolio::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let client = SkillfolioClient::builder()
//!         .base_url("http://localhost:5000/api")
//!         .token_path("/tmp/skillfolio-token")
//!         .build()?;
//!
//!     let session = client.session();
//!     if session.initialize().await != SessionState::Authenticated {
//!         session.login(&Credentials::new("ana@example.com", "secret")).await?;
//!     }
//!
//!     let mut board = SkillBoard::new(session);
//!     board.load().await?;
//!     board.set_filter(FilterState::new(FilterMode::Category, "Tech"));
//!     for skill in board.visible() {
//!         println!("{} ({})", skill.name, skill.level);
//!     }
//!     println!("{} skills", board.summary().summary().total_skills);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use board::SkillBoard;
pub use client::{SkillfolioClient, SkillfolioClientBuilder};
pub use config::ClientConfig;
pub use edit::{EditMode, EditSession};
pub use error::{Error, FieldError, Result};
pub use filter::{Filter, FilterMode, FilterState};
pub use repository::SkillRepository;
pub use resources::ReportReceipt;
pub use session::{
    Credential, FileTokenStore, MemoryTokenStore, SessionState, SessionStore, TokenStore,
};
pub use summary::{SummaryProjector, SummaryView};
pub use types::*;

// Module declarations
pub mod board;
pub mod client;
pub mod config;
pub mod edit;
pub mod error;
pub mod filter;
pub mod http;
pub mod observability;
pub mod repository;
pub mod resources;
pub mod session;
pub mod summary;
pub mod types;

#[cfg(feature = "trace")]
#[cfg_attr(docsrs, doc(cfg(feature = "trace")))]
pub use observability::init_tracing;

// Re-export the transport seam so callers can plug in their own
pub use skillfolio_transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use skillfolio::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ClientConfig, Error, Result, SkillBoard, SkillfolioClient,
        edit::{EditMode, EditSession},
        filter::{Filter, FilterMode, FilterState},
        repository::SkillRepository,
        session::{SessionState, SessionStore},
        summary::{SummaryProjector, SummaryView},
        types::{
            Credentials, Identity, ProfileUpdate, Registration, Skill, SkillDraft, SkillId,
            SkillLevel, SkillPatch, Summary,
        },
    };
}

/// Crate version, taken from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use config::{DEFAULT_BASE_URL, DEFAULT_RECENT_LIMIT};


#[cfg(test)]
pub(crate) mod test_support;
