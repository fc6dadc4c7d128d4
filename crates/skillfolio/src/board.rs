//! Dashboard-shaped composition of the core components
//!
//! [`SkillBoard`] wires one repository, one projector, the filter selection
//! and the edit coordinator together the way a dashboard screen uses them.
//! After every successful mutation it re-lists and re-fetches the server
//! summary, so what it shows always comes from the server.

use std::sync::Arc;

use tracing::warn;

use crate::{
    edit::EditSession,
    error::Result,
    filter::{self, FilterState},
    repository::SkillRepository,
    resources::ReportReceipt,
    session::SessionStore,
    summary::{SummaryProjector, SummaryView},
    types::{Skill, SkillDraft, SkillId, Summary},
};

/// Skills dashboard state.
pub struct SkillBoard {
    repository: SkillRepository,
    projector: SummaryProjector,
    filter: FilterState,
    edit: EditSession,
    server_summary: Option<(u64, Summary)>,
}

impl SkillBoard {
    /// Board over `session`, with the recently-updated bound taken from the
    /// client configuration.
    pub fn new(session: Arc<SessionStore>) -> Self {
        let projector = SummaryProjector::new(session.client().config().recent_limit);
        Self {
            repository: SkillRepository::new(session),
            projector,
            filter: FilterState::default(),
            edit: EditSession::new(),
            server_summary: None,
        }
    }

    /// Fetch the collection and the server summary concurrently.
    pub async fn load(&mut self) -> Result<()> {
        let epoch = self.repository.session().epoch();
        let (_, summary) = futures::try_join!(
            self.repository.list(),
            self.repository.server_summary()
        )?;
        self.server_summary = Some((epoch, summary));
        Ok(())
    }

    /// The held collection narrowed by the current filter.
    pub fn visible(&self) -> Vec<Skill> {
        let skills = self.repository.skills();
        let filter = self.filter.parse();
        filter::apply(&skills, &filter).into_iter().cloned().collect()
    }

    /// The server's summary when one was loaded for this session, otherwise
    /// one derived from the held collection.
    pub fn summary(&self) -> SummaryView {
        match &self.server_summary {
            Some((epoch, summary)) if self.repository.session().is_current(*epoch) => {
                SummaryView::Server(summary.clone())
            }
            _ => SummaryView::Derived(self.projector.project(&self.repository.skills())),
        }
    }

    /// Category names for a filter selector.
    pub fn categories(&self) -> Vec<String> {
        self.summary()
            .summary()
            .categories()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Replace the filter selection.
    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    /// Current filter selection.
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Open a blank create form.
    pub fn open_create(&mut self) {
        self.edit.open_create();
    }

    /// Open an edit form for `skill`.
    pub fn open_edit(&mut self, skill: Skill) {
        self.edit.open_edit(skill);
    }

    /// Close the form without saving.
    pub fn close(&mut self) {
        self.edit.close();
    }

    /// The edit coordinator.
    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    /// Save the open form, then refresh.
    pub async fn save(&mut self, draft: SkillDraft) -> Result<Skill> {
        let saved = self.edit.save(&self.repository, draft).await?;
        self.refresh().await;
        Ok(saved)
    }

    /// Delete a skill the user has already confirmed, then refresh.
    pub async fn delete(&mut self, id: SkillId) -> Result<()> {
        self.repository.delete(id).await?;
        self.refresh().await;
        Ok(())
    }

    /// E-mail the user a report of their skills.
    pub async fn send_report(&self) -> Result<ReportReceipt> {
        self.repository.send_report().await
    }

    /// The underlying repository.
    pub fn repository(&self) -> &SkillRepository {
        &self.repository
    }

    async fn refresh(&mut self) {
        if let Err(err) = self.load().await {
            warn!(error = %err, "Refresh after mutation failed; keeping local state");
            self.server_summary = None;
        }
    }
}

impl std::fmt::Debug for SkillBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillBoard")
            .field("filter", &self.filter)
            .field("edit", &self.edit.mode())
            .finish_non_exhaustive()
    }
}
