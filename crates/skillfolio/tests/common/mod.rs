//! Common test utilities and helpers

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use skillfolio::{Credentials, MemoryTokenStore, SessionStore, SkillfolioClient, TokenStore};
use skillfolio_transport::{HttpRequest, HttpResponse, Transport, TransportError};
use tokio::sync::oneshot;

enum Step {
    Respond(HttpResponse),
    Unreachable,
    Held(oneshot::Receiver<()>, HttpResponse),
}

/// Transport answering from a FIFO script in call order, recording every
/// request it sees.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Step>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: Value) {
        self.push(Step::Respond(HttpResponse::json_body(status, &body)));
    }

    pub fn respond_empty(&self, status: u16) {
        self.push(Step::Respond(HttpResponse::empty(status)));
    }

    pub fn unreachable(&self) {
        self.push(Step::Unreachable);
    }

    /// Queue a response that is withheld until the returned sender fires.
    pub fn respond_later(&self, status: u16, body: Value) -> oneshot::Sender<()> {
        let (release, held) = oneshot::channel();
        self.push(Step::Held(held, HttpResponse::json_body(status, &body)));
        release
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn request_lines(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| {
                let path = r.url.split_once("/api").map_or(r.url.as_str(), |(_, p)| p);
                format!("{} {}", r.method, path)
            })
            .collect()
    }

    fn push(&self, step: Step) {
        self.script.lock().unwrap().push_back(step);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_http(&self, request: HttpRequest) -> skillfolio_transport::Result<HttpResponse> {
        let step = self.script.lock().unwrap().pop_front();
        let line = format!("{} {}", request.method, request.url);
        self.sent.lock().unwrap().push(request);

        match step {
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::Held(held, response)) => {
                let _ = held.await;
                Ok(response)
            }
            Some(Step::Unreachable) => Err(TransportError::Connection("connection refused".into())),
            None => panic!("unexpected request: {line}"),
        }
    }
}

/// Client over `transport` with the default base URL.
pub fn client(transport: &Arc<MockTransport>) -> SkillfolioClient {
    SkillfolioClient::builder()
        .transport(transport.clone())
        .build()
        .unwrap()
}

/// Session logged in as user 1 with token `tok`; consumes one scripted response.
pub async fn logged_in_session(transport: &Arc<MockTransport>) -> Arc<SessionStore> {
    let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
    let session = Arc::new(SessionStore::new(client(transport), tokens));
    transport.respond(200, grant_json("tok", 1, "ana@example.com"));
    session
        .login(&Credentials::new("ana@example.com", "secret"))
        .await
        .unwrap();
    session
}

pub fn identity_json(id: i64, email: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "firstName": "Ana",
        "lastName": "Lee",
        "emailNotificationsEnabled": true
    })
}

pub fn grant_json(token: &str, id: i64, email: &str) -> Value {
    json!({"token": token, "user": identity_json(id, email)})
}

/// Skill record as the server returns it; `day` sets `lastUpdated`.
pub fn skill_json(id: i64, name: &str, category: &str, level: u8, day: u32) -> Value {
    let level_name = match level {
        1 => "Beginner",
        2 => "Intermediate",
        _ => "Expert",
    };
    json!({
        "id": id,
        "name": name,
        "category": category,
        "description": null,
        "level": level,
        "levelName": level_name,
        "createdAt": "2025-01-01T00:00:00Z",
        "lastUpdated": format!("2025-02-{day:02}T12:00:00Z")
    })
}

/// The three-skill collection used by several scenarios.
pub fn tech_soft_collection() -> Value {
    json!([
        skill_json(1, "Rust", "Tech", 1, 1),
        skill_json(2, "SQL", "Tech", 3, 2),
        skill_json(3, "Mentoring", "Soft", 2, 3),
    ])
}

pub fn summary_json(total: usize) -> Value {
    json!({
        "totalSkills": total,
        "byCategory": {"Tech": 2, "Soft": 1},
        "byLevel": {"1": 1, "2": 1, "3": 1},
        "recentlyUpdated": []
    })
}
