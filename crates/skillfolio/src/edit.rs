//! Edit Session Coordinator
//!
//! At most one create-or-update interaction is open at a time. Opening
//! another replaces it.

use tracing::debug;

use crate::error::{Error, Result};
use crate::repository::SkillRepository;
use crate::types::{Skill, SkillDraft, SkillId, SkillPatch};

/// What the open session, if any, is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Nothing open
    Closed,
    /// Creating a new skill
    Create,
    /// Editing the skill with this id
    Edit(SkillId),
}

/// The single in-progress create-or-update interaction.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    target: Option<Skill>,
    open: bool,
}

impl EditSession {
    /// Closed session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start creating a skill, replacing whatever was open.
    pub fn open_create(&mut self) {
        self.target = None;
        self.open = true;
        debug!("Edit session opened for create");
    }

    /// Start editing `skill`, replacing whatever was open.
    pub fn open_edit(&mut self, skill: Skill) {
        debug!(skill_id = %skill.id, "Edit session opened for update");
        self.target = Some(skill);
        self.open = true;
    }

    /// Close without saving.
    pub fn close(&mut self) {
        self.target = None;
        self.open = false;
    }

    /// Skill being edited; `None` in create mode or when closed.
    pub fn target(&self) -> Option<&Skill> {
        self.target.as_ref()
    }

    /// Whether a session is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Current mode.
    pub fn mode(&self) -> EditMode {
        match (&self.target, self.open) {
            (_, false) => EditMode::Closed,
            (None, true) => EditMode::Create,
            (Some(skill), true) => EditMode::Edit(skill.id),
        }
    }

    /// Form contents to start from: the target's fields, or `None` for a
    /// blank create form.
    pub fn initial_draft(&self) -> Option<SkillDraft> {
        self.target.as_ref().map(SkillDraft::from)
    }

    /// Save `draft` through `repository`: create in create mode, update the
    /// target otherwise. Closes on success.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] when no session is open. Any failure from
    /// the repository is returned with the session left open on the same
    /// target, so the save can be retried.
    pub async fn save(&mut self, repository: &SkillRepository, draft: SkillDraft) -> Result<Skill> {
        let saved = match self.mode() {
            EditMode::Closed => {
                return Err(Error::InvalidRequest("no edit session is open".to_string()));
            }
            EditMode::Create => repository.create(&draft).await?,
            EditMode::Edit(id) => repository.update(id, &SkillPatch::from(draft)).await?,
        };
        self.close();
        Ok(saved)
    }
}
