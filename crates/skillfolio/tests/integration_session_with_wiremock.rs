//! Session lifecycle against a mock HTTP server, over the real transport.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::{grant_json, identity_json};
use serde_json::json;
use skillfolio::prelude::*;
use skillfolio::{FileTokenStore, TokenStore};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> SkillfolioClient {
    SkillfolioClient::builder()
        .base_url(format!("{}/api", server.uri()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_login_then_restore_in_a_new_process() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let token_path = dir.path().join("token");

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "ana@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_json("jwt-1", 7, "ana@example.com")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_json(7, "ana@example.com")))
        .expect(1)
        .mount(&server)
        .await;

    let first = SessionStore::new(
        client_for(&server),
        Arc::new(FileTokenStore::new(&token_path)),
    );
    let identity = first
        .login(&Credentials::new("ana@example.com", "secret"))
        .await
        .unwrap();
    assert_eq!(identity.id, 7);
    first.teardown();

    let second = SessionStore::new(
        client_for(&server),
        Arc::new(FileTokenStore::new(&token_path)),
    );
    assert_eq!(second.initialize().await, SessionState::Authenticated);
    assert_eq!(second.current_user().unwrap().email, "ana@example.com");
}

#[tokio::test]
async fn test_expired_token_is_dropped_on_restore() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let token_path = dir.path().join("token");
    std::fs::write(&token_path, "expired-jwt").unwrap();

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let tokens = Arc::new(FileTokenStore::new(&token_path));
    let session = SessionStore::new(client_for(&server), tokens.clone());

    assert_eq!(session.initialize().await, SessionState::Unauthenticated);
    assert!(session.current_user().is_none());
    assert!(tokens.load().unwrap().is_none());
    assert!(!token_path.exists());
}

#[tokio::test]
async fn test_restore_with_server_down_degrades() {
    let dir = tempfile::tempdir().unwrap();
    let token_path = dir.path().join("token");
    std::fs::write(&token_path, "jwt").unwrap();

    let client = SkillfolioClient::builder()
        .base_url("http://127.0.0.1:1/api")
        .build()
        .unwrap();
    let session = SessionStore::new(client, Arc::new(FileTokenStore::new(&token_path)));

    assert_eq!(session.initialize().await, SessionState::Unauthenticated);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_bad_credentials_surface_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid email or password"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = client_for(&server).session();
    let err = session
        .login(&Credentials::new("ana@example.com", "wrong"))
        .await
        .unwrap_err();

    assert_matches!(err, Error::Authentication(ref msg) if msg == "Invalid email or password");
    assert!(err.is_auth());
    assert_eq!(session.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn test_register_posts_names_and_logs_in() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "email": "ana@example.com",
            "password": "secret",
            "firstName": "Ana",
            "lastName": "Lee"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_json("jwt-new", 11, "ana@example.com")))
        .expect(1)
        .mount(&server)
        .await;

    let session = client_for(&server).session();
    let identity = session
        .register(&Registration::new("ana@example.com", "secret", "Ana", "Lee"))
        .await
        .unwrap();

    assert_eq!(identity.id, 11);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_duplicate_email_registration_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_string("User with this email already exists"))
        .mount(&server)
        .await;

    let session = client_for(&server).session();
    let err = session
        .register(&Registration::new("ana@example.com", "secret", "Ana", "Lee"))
        .await
        .unwrap_err();

    assert_matches!(err, Error::Authentication(msg) if msg.contains("already exists"));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_profile_update_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_json("jwt-1", 7, "ana@example.com")))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/auth/profile"))
        .and(header("authorization", "Bearer jwt-1"))
        .and(body_json(json!({
            "id": 7,
            "email": "ana@example.com",
            "firstName": "Anna",
            "lastName": "Lee",
            "emailNotificationsEnabled": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "email": "ana@example.com",
            "firstName": "Anna",
            "lastName": "Lee",
            "emailNotificationsEnabled": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = client_for(&server).session();
    session
        .login(&Credentials::new("ana@example.com", "secret"))
        .await
        .unwrap();

    let updated = session
        .update_profile(&ProfileUpdate {
            first_name: "Anna".to_string(),
            last_name: "Lee".to_string(),
            email_notifications_enabled: false,
        })
        .await
        .unwrap();

    assert_eq!(updated.first_name, "Anna");
    assert_eq!(session.current_user().unwrap().display_name(), "Anna Lee");
}

#[tokio::test]
async fn test_rejected_token_mid_session_clears_identity() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_json("jwt-1", 7, "ana@example.com")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/skills"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = client_for(&server).session();
    session
        .login(&Credentials::new("ana@example.com", "secret"))
        .await
        .unwrap();

    let repo = SkillRepository::new(session.clone());
    assert_matches!(repo.list().await, Err(Error::Authentication(_)));

    assert!(session.current_user().is_none());
    assert!(session.token().is_none());
    assert_eq!(session.state(), SessionState::Unauthenticated);
}
