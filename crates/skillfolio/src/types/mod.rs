//! Core types for the Skillfolio API
//!
//! Wire shapes use camelCase field names, matching the server's JSON.

pub use identity::*;
pub use skill::*;
pub use summary::*;

pub mod identity;
pub mod skill;
pub mod summary;
