//! Session lifecycle states

use secrecy::SecretString;
use std::fmt;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No token and no identity.
    Unauthenticated,
    /// A persisted token is being checked against the server.
    Restoring,
    /// Token and identity are both held.
    Authenticated,
    /// The persisted token slot could not be read. Logging in still works.
    Failed,
}

impl SessionState {
    /// Anything but [`SessionState::Restoring`].
    pub fn is_settled(self) -> bool {
        self != SessionState::Restoring
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Restoring => "restoring",
            SessionState::Authenticated => "authenticated",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Token handed to a protected call, stamped with the session it belongs to.
///
/// The epoch lets the caller tell, once the response arrives, whether the
/// session that issued the call is still the current one.
#[derive(Clone)]
pub struct Credential {
    /// Bearer token
    pub token: SecretString,
    /// Session epoch at the time the call was authorized
    pub epoch: u64,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("epoch", &self.epoch)
            .finish()
    }
}
