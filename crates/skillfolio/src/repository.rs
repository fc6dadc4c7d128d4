//! Skill Repository
//!
//! Mediates every read and write of the user's skill collection and holds
//! the collection the rest of the crate derives its views from.
//!
//! # Ordering
//!
//! Calls are not serialized against each other, so responses can come back
//! in any order. The held collection follows these rules:
//!
//! - Each applied mutation (create, update, delete) gets a revision number
//!   and is remembered as a local edit.
//! - A `list()` is stamped with the revision current when it was issued.
//!   When its response is applied, edits newer than that stamp are replayed
//!   on top, so a list that was already in flight cannot bring back a
//!   deleted skill or drop a newly created one. Older edits are forgotten.
//! - Between two lists, the one issued last wins. An older list arriving
//!   late is not applied.
//! - The collection belongs to one session epoch. After logout it reads as
//!   empty, and responses from the old session are discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    resources::{ReportReceipt, Skills},
    session::{Credential, SessionStore},
    types::{Skill, SkillDraft, SkillId, SkillLevel, SkillPatch, Summary},
};

#[derive(Debug, Clone)]
enum EditKind {
    Created(Skill),
    Replaced(Skill),
    Deleted(SkillId),
}

#[derive(Debug)]
struct LocalEdit {
    revision: u64,
    kind: EditKind,
}

#[derive(Debug, Default)]
struct Collection {
    epoch: u64,
    skills: Vec<Skill>,
    loaded: bool,
    revision: u64,
    edits: Vec<LocalEdit>,
    lists_issued: u64,
    list_applied: u64,
}

impl Collection {
    fn for_epoch(epoch: u64) -> Self {
        Self {
            epoch,
            ..Default::default()
        }
    }

    fn position(&self, id: SkillId) -> Option<usize> {
        self.skills.iter().position(|skill| skill.id == id)
    }

    fn apply(&mut self, kind: &EditKind) {
        match kind {
            EditKind::Created(skill) => match self.position(skill.id) {
                Some(index) => self.skills[index] = skill.clone(),
                None => self.skills.push(skill.clone()),
            },
            EditKind::Replaced(skill) => {
                if let Some(index) = self.position(skill.id) {
                    self.skills[index] = skill.clone();
                }
            }
            EditKind::Deleted(id) => self.skills.retain(|skill| skill.id != *id),
        }
    }

    fn record(&mut self, kind: EditKind) {
        self.apply(&kind);
        self.revision += 1;
        self.edits.push(LocalEdit {
            revision: self.revision,
            kind,
        });
    }
}

/// Ticket for an in-flight `list()`.
struct ListTicket {
    sequence: u64,
    revision: u64,
}

/// Client-side view of the user's skill collection.
pub struct SkillRepository {
    session: Arc<SessionStore>,
    api: Skills,
    collection: Mutex<Collection>,
}

impl SkillRepository {
    /// Create a repository authorized by `session`.
    pub fn new(session: Arc<SessionStore>) -> Self {
        let api = session.client().skills();
        Self {
            session,
            api,
            collection: Mutex::new(Collection::default()),
        }
    }

    /// The session this repository draws its token from.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Fetch the full collection and make it the held one.
    ///
    /// Safe to call repeatedly. Returns the held collection after the
    /// response has been reconciled with local edits.
    ///
    /// # Errors
    ///
    /// [`Error::NotAuthenticated`], [`Error::SessionEnded`], or the mapped
    /// transport/server error. A failed list leaves the held collection as
    /// it was.
    pub async fn list(&self) -> Result<Vec<Skill>> {
        let credential = self.session.authorize()?;
        let ticket = {
            let mut collection = self.scoped(credential.epoch)?;
            collection.lists_issued += 1;
            ListTicket {
                sequence: collection.lists_issued,
                revision: collection.revision,
            }
        };

        let outcome = self.api.list(&credential.token).await;
        let fetched = self.session.settle(credential.epoch, "list", outcome)?;

        let mut collection = self.scoped(credential.epoch)?;
        if ticket.sequence < collection.list_applied {
            debug!(
                sequence = ticket.sequence,
                applied = collection.list_applied,
                "Ignoring list response overtaken by a later list"
            );
            return Ok(collection.skills.clone());
        }

        collection.skills = fetched;
        let replay: Vec<EditKind> = collection
            .edits
            .iter()
            .filter(|edit| edit.revision > ticket.revision)
            .map(|edit| edit.kind.clone())
            .collect();
        for kind in &replay {
            collection.apply(kind);
        }
        collection.edits.retain(|edit| edit.revision > ticket.revision);
        collection.list_applied = ticket.sequence;
        collection.loaded = true;

        debug!(
            count = collection.skills.len(),
            replayed = replay.len(),
            "Applied skill list"
        );
        Ok(collection.skills.clone())
    }

    /// Fetch one skill and refresh it in the held collection.
    pub async fn get(&self, id: SkillId) -> Result<Skill> {
        let credential = self.session.authorize()?;
        let outcome = self.api.get(&credential.token, id).await;
        let skill = self.session.settle(credential.epoch, "get", outcome)?;

        let mut collection = self.scoped(credential.epoch)?;
        if let Some(index) = collection.position(id) {
            collection.skills[index] = skill.clone();
        }
        Ok(skill)
    }

    /// Create a skill. The returned canonical record is in the held
    /// collection by the time this resolves.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] for a blank name or category (nothing is
    /// sent), otherwise as [`SkillRepository::list`].
    pub async fn create(&self, draft: &SkillDraft) -> Result<Skill> {
        draft.validate()?;
        let credential = self.session.authorize()?;

        let outcome = self.api.create(&credential.token, draft).await;
        let skill = self.session.settle(credential.epoch, "create", outcome)?;

        self.scoped(credential.epoch)?
            .record(EditKind::Created(skill.clone()));
        info!(skill_id = %skill.id, "Skill created");
        Ok(skill)
    }

    /// Overwrite the fields set in `patch`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when `id` is not in a loaded collection (nothing
    /// is sent) or the server does not know it; the collection is unchanged
    /// either way.
    pub async fn update(&self, id: SkillId, patch: &SkillPatch) -> Result<Skill> {
        patch.validate()?;
        let credential = self.session.authorize()?;
        self.ensure_known(&credential, id)?;

        let outcome = self.api.update(&credential.token, id, patch).await;
        let skill = self.session.settle(credential.epoch, "update", outcome)?;

        self.scoped(credential.epoch)?
            .record(EditKind::Replaced(skill.clone()));
        info!(skill_id = %id, "Skill updated");
        Ok(skill)
    }

    /// Delete a skill. Confirming with the user is the caller's job.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when `id` is not in a loaded collection or the
    /// server does not know it; the collection is unchanged either way.
    pub async fn delete(&self, id: SkillId) -> Result<()> {
        let credential = self.session.authorize()?;
        self.ensure_known(&credential, id)?;

        let outcome = self.api.delete(&credential.token, id).await;
        self.session.settle(credential.epoch, "delete", outcome)?;

        self.scoped(credential.epoch)?.record(EditKind::Deleted(id));
        info!(skill_id = %id, "Skill deleted");
        Ok(())
    }

    /// The server's own summary of the collection.
    pub async fn server_summary(&self) -> Result<Summary> {
        let credential = self.session.authorize()?;
        let outcome = self.api.summary(&credential.token).await;
        self.session.settle(credential.epoch, "summary", outcome)
    }

    /// Server-side category query. Does not touch the held collection.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Skill>> {
        let credential = self.session.authorize()?;
        let outcome = self.api.by_category(&credential.token, category).await;
        self.session.settle(credential.epoch, "list_by_category", outcome)
    }

    /// Server-side level query. Does not touch the held collection.
    pub async fn list_by_level(&self, level: SkillLevel) -> Result<Vec<Skill>> {
        let credential = self.session.authorize()?;
        let outcome = self.api.by_level(&credential.token, level).await;
        self.session.settle(credential.epoch, "list_by_level", outcome)
    }

    /// Ask the server to e-mail a report of the collection.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] when the held collection is empty or not
    /// loaded yet.
    pub async fn send_report(&self) -> Result<ReportReceipt> {
        let credential = self.session.authorize()?;
        if self.skills().is_empty() {
            return Err(Error::InvalidRequest(
                "add at least one skill before sending a report".to_string(),
            ));
        }

        let outcome = self.api.send_report(&credential.token).await;
        let receipt = self.session.settle(credential.epoch, "send_report", outcome)?;
        info!("Skills report requested");
        Ok(receipt)
    }

    /// Snapshot of the held collection, in server order.
    pub fn skills(&self) -> Vec<Skill> {
        self.current()
            .map(|collection| collection.skills.clone())
            .unwrap_or_default()
    }

    /// Whether the held collection has a skill with `id`.
    pub fn contains(&self, id: SkillId) -> bool {
        self.current()
            .is_some_and(|collection| collection.position(id).is_some())
    }

    /// Whether a list has been applied in the current session.
    pub fn is_loaded(&self) -> bool {
        self.current().is_some_and(|collection| collection.loaded)
    }

    fn ensure_known(&self, credential: &Credential, id: SkillId) -> Result<()> {
        let collection = self.scoped(credential.epoch)?;
        if collection.loaded && collection.position(id).is_none() {
            debug!(skill_id = %id, "Rejecting call for a skill not in the collection");
            return Err(Error::NotFound(format!("skill {id} is not in the collection")));
        }
        Ok(())
    }

    /// Collection for `epoch`, starting a fresh one when the session has
    /// moved on since the last call.
    fn scoped(&self, epoch: u64) -> Result<MutexGuard<'_, Collection>> {
        let mut collection = self.lock();
        if collection.epoch < epoch {
            debug!(from = collection.epoch, to = epoch, "Starting collection for new session");
            *collection = Collection::for_epoch(epoch);
        } else if collection.epoch > epoch {
            return Err(Error::SessionEnded);
        }
        Ok(collection)
    }

    fn current(&self) -> Option<MutexGuard<'_, Collection>> {
        let epoch = self.session.epoch();
        let collection = self.lock();
        (collection.epoch == epoch).then_some(collection)
    }

    fn lock(&self) -> MutexGuard<'_, Collection> {
        self.collection.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SkillRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillRepository")
            .field("loaded", &self.is_loaded())
            .field("len", &self.skills().len())
            .finish_non_exhaustive()
    }
}
