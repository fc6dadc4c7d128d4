//! Durable slot for the session token

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{Error, Result};

/// Single-value slot holding the token between runs.
///
/// Read once when a session is restored, written on login and cleared on
/// logout. Synchronous so that logging out never waits on I/O scheduling.
pub trait TokenStore: Send + Sync {
    /// Persisted token, if any.
    fn load(&self) -> Result<Option<SecretString>>;

    /// Replace the persisted token.
    fn save(&self, token: &SecretString) -> Result<()>;

    /// Forget the persisted token. Clearing an empty slot succeeds.
    fn clear(&self) -> Result<()>;
}

/// Token slot that lives as long as the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<SecretString>>,
}

impl MemoryTokenStore {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot already holding `token`, as if a previous run had logged in.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(SecretString::new(token.into().into_boxed_str()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, token: &SecretString) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(())
    }
}

impl std::fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTokenStore").finish_non_exhaustive()
    }
}

/// Token slot backed by a single file.
///
/// A missing or blank file means no token; surrounding whitespace is ignored.
/// On unix the file is readable by its owner only.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Slot stored at `path`. Nothing is touched until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the slot.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn failure(&self, action: &str, err: std::io::Error) -> Error {
        Error::TokenStore(format!("failed to {action} {}: {err}", self.path.display()))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SecretString>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| SecretString::new(token.into())))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.failure("read", err)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.failure("create directory for", e))?;
        }
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(|e| self.failure("open", e))?;

        // `mode` only applies on creation; tighten a slot left by an older run
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.failure("restrict", e))?;
        }
        file.write_all(token.expose_secret().as_bytes())
            .map_err(|e| self.failure("write", e))?;
        debug!(path = %self.path.display(), "Persisted session token");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.failure("remove", err)),
        }
    }
}
