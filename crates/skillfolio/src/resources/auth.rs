//! Auth API endpoints

use secrecy::SecretString;

use crate::{
    client::SkillfolioClient,
    error::{Error, Result},
    http::{ApiRequest, ResponseExt},
    types::{AuthGrant, Credentials, Identity, Registration},
};

/// Auth API resource.
///
/// Register, log in, and read or change the current user's profile.
#[derive(Clone)]
pub struct Auth {
    client: SkillfolioClient,
}

impl Auth {
    /// Create a new Auth resource.
    pub(crate) fn new(client: SkillfolioClient) -> Self {
        Self { client }
    }

    /// Create an account and receive a token for it.
    ///
    /// # Errors
    ///
    /// Fails locally with [`Error::InvalidRequest`] for malformed input.
    /// A 4xx answer (such as an already-registered email) is reported as
    /// [`Error::Authentication`] carrying the server's message.
    pub async fn register(&self, registration: &Registration) -> Result<AuthGrant> {
        registration.validate()?;
        let request = ApiRequest::post("/auth/register").json(&registration.to_wire())?;
        self.grant(request).await
    }

    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Fails locally with [`Error::InvalidRequest`] for malformed input.
    /// Any 4xx answer is reported as [`Error::Authentication`].
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthGrant> {
        credentials.validate()?;
        let request = ApiRequest::post("/auth/login").json(&credentials.to_wire())?;
        self.grant(request).await
    }

    /// Fetch the identity a token belongs to.
    pub async fn me(&self, token: &SecretString) -> Result<Identity> {
        self.client
            .send(ApiRequest::get("/auth/me").bearer(token))
            .await
    }

    /// Replace the editable profile fields of the token's user.
    pub async fn update_profile(&self, token: &SecretString, profile: &Identity) -> Result<Identity> {
        let request = ApiRequest::put("/auth/profile").bearer(token).json(profile)?;
        self.client.send(request).await
    }

    async fn grant(&self, request: ApiRequest) -> Result<AuthGrant> {
        let response = self.client.execute(request).await?;
        if (400..500).contains(&response.status) {
            return Err(match Error::from_response(response.status, &response.text()) {
                Error::Validation { message, .. }
                | Error::Authentication(message)
                | Error::Forbidden(message)
                | Error::NotFound(message)
                | Error::Conflict(message)
                | Error::Api { message, .. } => Error::Authentication(message),
                other => other,
            });
        }
        response.parse_result()
    }
}
