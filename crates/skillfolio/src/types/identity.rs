//! Identity, credentials, and auth payloads

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::observability::log_validation_error;

/// The authenticated user's profile as held client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Server-assigned user id
    pub id: i64,
    /// Login email (cannot be changed through a profile update)
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Whether periodic summary emails are wanted
    #[serde(default)]
    pub email_notifications_enabled: bool,
}

impl Identity {
    /// `"First Last"`
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Copy of this identity with the editable fields replaced.
    pub fn with_profile(&self, update: &ProfileUpdate) -> Self {
        Self {
            id: self.id,
            email: self.email.clone(),
            first_name: update.first_name.clone(),
            last_name: update.last_name.clone(),
            email_notifications_enabled: update.email_notifications_enabled,
        }
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Whether periodic summary emails are wanted
    pub email_notifications_enabled: bool,
}

impl ProfileUpdate {
    /// Check that both names are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if a name is blank.
    pub fn validate(&self) -> Result<()> {
        require("firstName", &self.first_name)?;
        require("lastName", &self.last_name)
    }
}

impl From<&Identity> for ProfileUpdate {
    fn from(identity: &Identity) -> Self {
        Self {
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            email_notifications_enabled: identity.email_notifications_enabled,
        }
    }
}

/// Email and password for a login attempt.
#[derive(Clone)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Password, never logged
    pub password: SecretString,
}

impl Credentials {
    /// Create credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::new(password.into().into_boxed_str()),
        }
    }

    /// Check the fields before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for a malformed email or an empty password.
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        if self.password.expose_secret().is_empty() {
            log_validation_error("password", "must not be empty");
            return Err(Error::InvalidRequest("password must not be empty".to_string()));
        }
        Ok(())
    }

    pub(crate) fn to_wire(&self) -> LoginBody<'_> {
        LoginBody {
            email: &self.email,
            password: self.password.expose_secret(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Details for provisioning a new account.
#[derive(Clone, Debug)]
pub struct Registration {
    /// Email and password for the new account
    pub credentials: Credentials,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

impl Registration {
    /// Create a registration.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            credentials: Credentials::new(email, password),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Check the fields before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for a malformed email, an empty
    /// password, or a blank name.
    pub fn validate(&self) -> Result<()> {
        self.credentials.validate()?;
        require("firstName", &self.first_name)?;
        require("lastName", &self.last_name)
    }

    pub(crate) fn to_wire(&self) -> RegisterBody<'_> {
        RegisterBody {
            email: &self.credentials.email,
            password: self.credentials.password.expose_secret(),
            first_name: &self.first_name,
            last_name: &self.last_name,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterBody<'a> {
    email: &'a str,
    password: &'a str,
    first_name: &'a str,
    last_name: &'a str,
}

/// Successful login/registration response.
pub struct AuthGrant {
    /// Bearer token bound to `user`
    pub token: SecretString,
    /// The authenticated identity
    pub user: Identity,
}

impl fmt::Debug for AuthGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGrant")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

impl<'de> Deserialize<'de> for AuthGrant {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire {
            token: String,
            user: Identity,
        }

        let wire = Wire::deserialize(deserializer)?;
        if wire.token.is_empty() {
            return Err(serde::de::Error::custom("empty token"));
        }
        Ok(AuthGrant {
            token: SecretString::new(wire.token.into_boxed_str()),
            user: wire.user,
        })
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        log_validation_error(field, "must not be empty");
        return Err(Error::InvalidRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Only `local@domain` shape; the server has the final word.
fn validate_email(email: &str) -> Result<()> {
    let valid = !email.chars().any(char::is_whitespace)
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            });

    if valid {
        Ok(())
    } else {
        log_validation_error("email", "not a valid address");
        Err(Error::InvalidRequest(format!("'{email}' is not a valid email address")))
    }
}
