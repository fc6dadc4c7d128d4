//! Out-of-order responses, logout with requests in flight, and the
//! edit-session save flow, driven through a scripted transport.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::{MockTransport, logged_in_session, skill_json, tech_soft_collection};
use serde_json::json;
use skillfolio::prelude::*;

fn ids(skills: &[Skill]) -> Vec<i64> {
    skills.iter().map(|s| s.id.0).collect()
}

#[tokio::test]
async fn test_list_arriving_after_delete_does_not_resurrect() {
    let transport = MockTransport::new();
    let session = logged_in_session(&transport).await;
    let repo = Arc::new(SkillRepository::new(session));

    transport.respond(200, tech_soft_collection());
    repo.list().await.unwrap();

    let release = transport.respond_later(200, tech_soft_collection());
    let in_flight = tokio::spawn({
        let repo = repo.clone();
        async move { repo.list().await }
    });
    tokio::task::yield_now().await;

    transport.respond_empty(204);
    repo.delete(SkillId(3)).await.unwrap();

    release.send(()).unwrap();
    in_flight.await.unwrap().unwrap();

    assert_eq!(ids(&repo.skills()), vec![1, 2]);
    assert!(!repo.contains(SkillId(3)));
}

#[tokio::test]
async fn test_list_issued_after_delete_is_taken_as_is() {
    let transport = MockTransport::new();
    let session = logged_in_session(&transport).await;
    let repo = SkillRepository::new(session);

    transport.respond(200, tech_soft_collection());
    repo.list().await.unwrap();
    transport.respond_empty(204);
    repo.delete(SkillId(3)).await.unwrap();

    // Server state wins once a list is issued after the edit.
    transport.respond(200, json!([skill_json(1, "Rust", "Tech", 1, 1)]));
    let listed = repo.list().await.unwrap();
    assert_eq!(ids(&listed), vec![1]);
}

#[tokio::test]
async fn test_responses_after_logout_are_ignored() {
    let transport = MockTransport::new();
    let session = logged_in_session(&transport).await;
    let repo = Arc::new(SkillRepository::new(session.clone()));

    let list_release = transport.respond_later(200, tech_soft_collection());
    let listing = tokio::spawn({
        let repo = repo.clone();
        async move { repo.list().await }
    });
    tokio::task::yield_now().await;

    let create_release = transport.respond_later(200, skill_json(9, "Go", "Tech", 2, 9));
    let creating = tokio::spawn({
        let repo = repo.clone();
        async move {
            repo.create(&SkillDraft::new("Go", "Tech", SkillLevel::Intermediate))
                .await
        }
    });
    tokio::task::yield_now().await;

    session.logout();
    list_release.send(()).unwrap();
    create_release.send(()).unwrap();

    assert_matches!(listing.await.unwrap(), Err(Error::SessionEnded));
    assert_matches!(creating.await.unwrap(), Err(Error::SessionEnded));
    assert!(repo.skills().is_empty());
    assert!(session.current_user().is_none());
    assert!(session.token().is_none());
    assert_eq!(session.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_collection_does_not_leak_into_next_session() {
    let transport = MockTransport::new();
    let session = logged_in_session(&transport).await;
    let repo = SkillRepository::new(session.clone());

    transport.respond(200, tech_soft_collection());
    repo.list().await.unwrap();
    session.logout();
    assert!(!repo.is_loaded());

    transport.respond(200, common::grant_json("tok-2", 2, "ben@example.com"));
    session
        .login(&Credentials::new("ben@example.com", "secret"))
        .await
        .unwrap();

    assert!(repo.skills().is_empty());
    transport.respond(200, json!([]));
    assert!(repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_of_unknown_id_is_not_found_and_unchanged() {
    let transport = MockTransport::new();
    let session = logged_in_session(&transport).await;
    let repo = SkillRepository::new(session);

    transport.respond(200, tech_soft_collection());
    let before = repo.list().await.unwrap();

    let err = repo
        .update(SkillId(99), &SkillPatch::default().name("X"))
        .await
        .unwrap_err();

    assert_matches!(err, Error::NotFound(_));
    assert_eq!(repo.skills(), before);
}

#[tokio::test]
async fn test_delete_of_unknown_id_is_not_found_and_unchanged() {
    let transport = MockTransport::new();
    let session = logged_in_session(&transport).await;
    let repo = SkillRepository::new(session);

    transport.respond(200, tech_soft_collection());
    let before = repo.list().await.unwrap();

    assert_matches!(repo.delete(SkillId(42)).await, Err(Error::NotFound(_)));
    assert_eq!(repo.skills(), before);
    assert_eq!(transport.request_lines(), vec!["POST /auth/login", "GET /skills"]);
}

#[tokio::test]
async fn test_create_returns_draft_fields_and_lists_afterwards() {
    let transport = MockTransport::new();
    let session = logged_in_session(&transport).await;
    let repo = SkillRepository::new(session);

    let mut created = skill_json(4, "Kubernetes", "Ops", 2, 4);
    created["description"] = json!("cluster admin");
    transport.respond(201, created.clone());

    let draft = SkillDraft::new("Kubernetes", "Ops", SkillLevel::Intermediate)
        .with_description("cluster admin");
    let skill = repo.create(&draft).await.unwrap();

    assert_eq!(skill.name, draft.name);
    assert_eq!(skill.category, draft.category);
    assert_eq!(skill.level, draft.level);
    assert_eq!(skill.description, draft.description);

    transport.respond(200, json!([created]));
    let listed = repo.list().await.unwrap();
    assert!(listed.iter().any(|s| s.id == skill.id));
}

#[tokio::test]
async fn test_edit_session_dispatches_create_then_update() {
    let transport = MockTransport::new();
    let session = logged_in_session(&transport).await;
    let repo = SkillRepository::new(session);
    let mut edit = EditSession::new();

    edit.open_create();
    transport.respond(201, skill_json(5, "Rust", "Tech", 1, 5));
    let created = edit
        .save(&repo, SkillDraft::new("Rust", "Tech", SkillLevel::Beginner))
        .await
        .unwrap();
    assert_eq!(edit.mode(), EditMode::Closed);

    edit.open_edit(created.clone());
    transport.respond(200, skill_json(5, "Rust", "Tech", 3, 6));
    let mut draft = SkillDraft::from(&created);
    draft.level = SkillLevel::Expert;
    let updated = edit.save(&repo, draft).await.unwrap();

    assert_eq!(updated.level, SkillLevel::Expert);
    assert!(!edit.is_open());
    assert_eq!(
        transport.request_lines(),
        vec!["POST /auth/login", "POST /skills", "PUT /skills/5"]
    );
    assert_eq!(repo.skills()[0].level, SkillLevel::Expert);
}

#[tokio::test]
async fn test_failed_save_keeps_session_open() {
    let transport = MockTransport::new();
    let session = logged_in_session(&transport).await;
    let repo = SkillRepository::new(session);
    let mut edit = EditSession::new();

    edit.open_create();
    transport.unreachable();
    let err = edit
        .save(&repo, SkillDraft::new("Rust", "Tech", SkillLevel::Beginner))
        .await
        .unwrap_err();

    assert!(err.is_network());
    assert_eq!(edit.mode(), EditMode::Create);

    let err = edit
        .save(&repo, SkillDraft::new("", "Tech", SkillLevel::Beginner))
        .await
        .unwrap_err();
    assert_matches!(err, Error::InvalidRequest(_));
    assert!(edit.is_open());
}

#[tokio::test]
async fn test_save_without_open_session_is_rejected() {
    let transport = MockTransport::new();
    let session = logged_in_session(&transport).await;
    let repo = SkillRepository::new(session);
    let mut edit = EditSession::new();

    let err = edit
        .save(&repo, SkillDraft::new("Rust", "Tech", SkillLevel::Beginner))
        .await
        .unwrap_err();
    assert_matches!(err, Error::InvalidRequest(_));
}
