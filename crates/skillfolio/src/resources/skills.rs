//! Skills API endpoints

use secrecy::SecretString;
use serde::Deserialize;

use crate::{
    client::SkillfolioClient,
    error::Result,
    http::{ApiRequest, ResponseExt},
    types::{Skill, SkillDraft, SkillId, SkillLevel, SkillPatch, Summary},
};

const DEFAULT_REPORT_MESSAGE: &str = "Skills report sent";

/// Server acknowledgement of a report e-mail.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportReceipt {
    /// Human-readable confirmation
    pub message: String,
}

/// Skills API resource.
///
/// Every call needs the session token. Nothing here holds state; see
/// [`SkillRepository`](crate::repository::SkillRepository) for the
/// collection the rest of the crate reads from.
#[derive(Clone)]
pub struct Skills {
    client: SkillfolioClient,
}

impl Skills {
    /// Create a new Skills resource.
    pub(crate) fn new(client: SkillfolioClient) -> Self {
        Self { client }
    }

    /// `GET /skills`, in server order.
    pub async fn list(&self, token: &SecretString) -> Result<Vec<Skill>> {
        self.client.send(ApiRequest::get("/skills").bearer(token)).await
    }

    /// `GET /skills/{id}`
    pub async fn get(&self, token: &SecretString, id: SkillId) -> Result<Skill> {
        self.client
            .send(ApiRequest::get(format!("/skills/{id}")).bearer(token))
            .await
    }

    /// `POST /skills`. The draft is checked before anything is sent.
    pub async fn create(&self, token: &SecretString, draft: &SkillDraft) -> Result<Skill> {
        draft.validate()?;
        let request = ApiRequest::post("/skills").bearer(token).json(draft)?;
        self.client.send(request).await
    }

    /// `PUT /skills/{id}` with only the fields set in `patch`.
    pub async fn update(&self, token: &SecretString, id: SkillId, patch: &SkillPatch) -> Result<Skill> {
        patch.validate()?;
        let request = ApiRequest::put(format!("/skills/{id}"))
            .bearer(token)
            .json(patch)?;
        self.client.send(request).await
    }

    /// `DELETE /skills/{id}`
    pub async fn delete(&self, token: &SecretString, id: SkillId) -> Result<()> {
        self.client
            .send_empty(ApiRequest::delete(format!("/skills/{id}")).bearer(token))
            .await
    }

    /// `GET /skills/summary`
    pub async fn summary(&self, token: &SecretString) -> Result<Summary> {
        self.client
            .send(ApiRequest::get("/skills/summary").bearer(token))
            .await
    }

    /// `GET /skills/category/{category}`; the category is percent-encoded.
    pub async fn by_category(&self, token: &SecretString, category: &str) -> Result<Vec<Skill>> {
        let path = format!("/skills/category/{}", urlencoding::encode(category));
        self.client.send(ApiRequest::get(path).bearer(token)).await
    }

    /// `GET /skills/level/{ordinal}`
    pub async fn by_level(&self, token: &SecretString, level: SkillLevel) -> Result<Vec<Skill>> {
        let path = format!("/skills/level/{}", level.ordinal());
        self.client.send(ApiRequest::get(path).bearer(token)).await
    }

    /// `POST /skills/send-report`: e-mail the user a report of their skills.
    pub async fn send_report(&self, token: &SecretString) -> Result<ReportReceipt> {
        let response = self
            .client
            .execute(ApiRequest::post("/skills/send-report").bearer(token))
            .await?
            .error_for_status()?;

        Ok(response
            .json::<ReportReceipt>()
            .unwrap_or_else(|_| ReportReceipt {
                message: DEFAULT_REPORT_MESSAGE.to_string(),
            }))
    }
}
