//! Session Store
//!
//! Owns the token and the identity it belongs to, and moves between
//! [`SessionState`]s as the user restores a session, logs in, or logs out.
//!
//! Every session gets an epoch. Logging out, tearing down, or losing the
//! token to a 401 starts a new epoch, and any response stamped with an older
//! one is discarded instead of being applied. That is how a request still in
//! flight at logout is kept from bringing the identity back.
//!
//! The slot lock is held while the persisted token and the published state
//! change, so the three never disagree once a transition returns.

mod state;
mod token_store;

pub use state::{Credential, SessionState};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    client::SkillfolioClient,
    error::{Error, Result},
    observability::log_discarded,
    types::{AuthGrant, Credentials, Identity, ProfileUpdate, Registration},
};

struct Slot {
    token: Option<SecretString>,
    identity: Option<Identity>,
    epoch: u64,
}

impl Slot {
    fn reset(&mut self) {
        self.token = None;
        self.identity = None;
        self.epoch += 1;
    }
}

/// Authenticated session lifecycle.
///
/// Construct one per application run and share it (`Arc<SessionStore>`)
/// with whatever needs to make protected calls.
pub struct SessionStore {
    client: SkillfolioClient,
    tokens: Arc<dyn TokenStore>,
    slot: Mutex<Slot>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Create an unauthenticated session over `tokens`.
    pub fn new(client: SkillfolioClient, tokens: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Unauthenticated);
        Self {
            client,
            tokens,
            slot: Mutex::new(Slot {
                token: None,
                identity: None,
                epoch: 0,
            }),
            state,
        }
    }

    /// The client this session authorizes.
    pub fn client(&self) -> &SkillfolioClient {
        &self.client
    }

    /// Restore a persisted session, if there is one.
    ///
    /// Never fails: a rejected token, an unreachable server, or an
    /// unreadable slot all leave the session usable for a fresh login.
    /// Resolves once the state has settled.
    pub async fn initialize(&self) -> SessionState {
        let persisted = match self.tokens.load() {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "Token slot unreadable; starting without a session");
                let mut slot = self.slot();
                slot.reset();
                self.set_state(SessionState::Failed);
                return SessionState::Failed;
            }
        };

        let Some(token) = persisted else {
            debug!("No persisted token");
            self.set_state(SessionState::Unauthenticated);
            return SessionState::Unauthenticated;
        };

        let epoch = self.slot().epoch;
        self.set_state(SessionState::Restoring);

        let outcome = self.client.auth().me(&token).await;

        let mut slot = self.slot();
        if slot.epoch != epoch {
            log_discarded("restore", epoch, slot.epoch);
            return *self.state.borrow();
        }

        match outcome {
            Ok(identity) => {
                info!(user_id = identity.id, "Session restored");
                slot.token = Some(token);
                slot.identity = Some(identity);
                self.set_state(SessionState::Authenticated);
                SessionState::Authenticated
            }
            Err(err) => {
                warn!(error = %err, "Could not restore session; continuing unauthenticated");
                slot.reset();
                self.clear_persisted();
                self.set_state(SessionState::Unauthenticated);
                SessionState::Unauthenticated
            }
        }
    }

    /// Log in with `credentials`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] for malformed input (nothing is sent),
    /// [`Error::Authentication`] when the server refuses, [`Error::Network`]
    /// when it cannot be reached. The session is left as it was.
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        let epoch = self.epoch();
        let grant = self.client.auth().login(credentials).await?;
        self.establish(epoch, grant, "login")
    }

    /// Create an account and log into it.
    ///
    /// # Errors
    ///
    /// Same as [`SessionStore::login`].
    pub async fn register(&self, registration: &Registration) -> Result<Identity> {
        let epoch = self.epoch();
        let grant = self.client.auth().register(registration).await?;
        self.establish(epoch, grant, "register")
    }

    /// End the session and forget the persisted token.
    ///
    /// Requests still in flight are not cancelled; their results are
    /// discarded when they arrive.
    pub fn logout(&self) {
        let mut slot = self.slot();
        let had_session = slot.token.is_some();
        slot.reset();
        self.clear_persisted();
        self.set_state(SessionState::Unauthenticated);
        drop(slot);
        if had_session {
            info!("Logged out");
        }
    }

    /// Drop the in-memory session but keep the persisted token, so the next
    /// [`SessionStore::initialize`] can restore it.
    pub fn teardown(&self) {
        let mut slot = self.slot();
        slot.reset();
        self.set_state(SessionState::Unauthenticated);
        drop(slot);
        debug!("Session torn down");
    }

    /// Replace the cached identity without touching the token.
    ///
    /// # Errors
    ///
    /// [`Error::NotAuthenticated`] when there is no session, or
    /// [`Error::InvalidRequest`] when `identity` belongs to another user.
    pub fn update_identity(&self, identity: Identity) -> Result<()> {
        let mut slot = self.slot();
        match &slot.identity {
            None => Err(Error::NotAuthenticated),
            Some(current) if current.id != identity.id => Err(Error::InvalidRequest(format!(
                "identity {} does not belong to the current session",
                identity.id
            ))),
            Some(_) => {
                slot.identity = Some(identity);
                Ok(())
            }
        }
    }

    /// Change the editable profile fields on the server, then cache the
    /// server's record. The email is kept from the cached identity.
    ///
    /// # Errors
    ///
    /// [`Error::NotAuthenticated`] without a session, [`Error::SessionEnded`]
    /// if the session ended while the call was in flight, or the mapped
    /// server error.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Identity> {
        update.validate()?;
        let credential = self.authorize()?;
        let current = self.current_user().ok_or(Error::NotAuthenticated)?;

        let outcome = self
            .client
            .auth()
            .update_profile(&credential.token, &current.with_profile(update))
            .await;
        let returned = self.settle(credential.epoch, "update_profile", outcome)?;

        let identity = Identity {
            email: current.email,
            ..returned
        };
        self.update_identity(identity.clone())?;
        info!(user_id = identity.id, "Profile updated");
        Ok(identity)
    }

    /// Cached identity.
    pub fn current_user(&self) -> Option<Identity> {
        self.slot().identity.clone()
    }

    /// Current token.
    pub fn token(&self) -> Option<SecretString> {
        self.slot().token.clone()
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Whether a token and identity are held.
    pub fn is_authenticated(&self) -> bool {
        self.slot().identity.is_some()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resolve once the state is anything but `Restoring`.
    pub async fn wait_until_settled(&self) -> SessionState {
        let mut receiver = self.subscribe();
        match receiver.wait_for(|state| state.is_settled()).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        }
    }

    /// Token for a protected call, stamped with the current epoch.
    ///
    /// # Errors
    ///
    /// [`Error::NotAuthenticated`] when no token is held.
    pub fn authorize(&self) -> Result<Credential> {
        let slot = self.slot();
        slot.token
            .clone()
            .map(|token| Credential {
                token,
                epoch: slot.epoch,
            })
            .ok_or(Error::NotAuthenticated)
    }

    /// Current epoch.
    pub fn epoch(&self) -> u64 {
        self.slot().epoch
    }

    /// Whether `epoch` is still the live session.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.slot().epoch == epoch
    }

    /// Drop the session whose token the server just rejected.
    ///
    /// Token and identity are cleared together. Does nothing when `epoch`
    /// has already ended.
    pub fn invalidate(&self, epoch: u64) {
        let mut slot = self.slot();
        if slot.epoch != epoch {
            return;
        }
        slot.reset();
        self.clear_persisted();
        self.set_state(SessionState::Unauthenticated);
        drop(slot);
        warn!(epoch, "Session token rejected; session cleared");
    }

    /// Apply the session rules to the outcome of a protected call issued
    /// under `epoch`: stale results become [`Error::SessionEnded`], and a 401
    /// ends the session.
    pub(crate) fn settle<T>(&self, epoch: u64, operation: &str, outcome: Result<T>) -> Result<T> {
        let current = self.epoch();
        if current != epoch {
            log_discarded(operation, epoch, current);
            return Err(Error::SessionEnded);
        }
        if let Err(Error::Authentication(_)) = &outcome {
            self.invalidate(epoch);
        }
        outcome
    }

    fn establish(&self, epoch: u64, grant: AuthGrant, operation: &str) -> Result<Identity> {
        let mut slot = self.slot();
        if slot.epoch != epoch {
            log_discarded(operation, epoch, slot.epoch);
            return Err(Error::SessionEnded);
        }
        if let Err(err) = self.tokens.save(&grant.token) {
            warn!(error = %err, "Could not persist session token");
        }
        slot.epoch += 1;
        slot.token = Some(grant.token);
        slot.identity = Some(grant.user.clone());
        self.set_state(SessionState::Authenticated);
        drop(slot);

        let identity = grant.user;
        info!(user_id = identity.id, operation, "Session established");
        Ok(identity)
    }

    fn clear_persisted(&self) {
        if let Err(err) = self.tokens.clear() {
            warn!(error = %err, "Could not clear persisted token");
        }
    }

    fn set_state(&self, state: SessionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(from = %previous, to = %state, "Session state changed");
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state())
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}
