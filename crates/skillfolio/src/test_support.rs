//! In-process transport and fixtures for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use skillfolio_transport::{HttpRequest, HttpResponse, Result, Transport, TransportError};
use tokio::sync::oneshot;

enum Step {
    Respond(HttpResponse),
    Unreachable,
    Held(oneshot::Receiver<()>, HttpResponse),
}

/// Answers requests from a FIFO script, in the order the calls are made.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_json(&self, status: u16, body: Value) {
        self.push(Step::Respond(HttpResponse::json_body(status, &body)));
    }

    pub(crate) fn push_text(&self, status: u16, body: &str) {
        self.push(Step::Respond(HttpResponse::new(
            status,
            Default::default(),
            body.as_bytes().to_vec(),
        )));
    }

    pub(crate) fn push_unreachable(&self) {
        self.push(Step::Unreachable);
    }

    /// Queue a response that is only delivered once the returned sender fires
    /// (or is dropped).
    pub(crate) fn push_held_json(&self, status: u16, body: Value) -> oneshot::Sender<()> {
        let (release, held) = oneshot::channel();
        self.push(Step::Held(held, HttpResponse::json_body(status, &body)));
        release
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    fn push(&self, step: Step) {
        self.script.lock().unwrap().push_back(step);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_http(&self, request: HttpRequest) -> Result<HttpResponse> {
        let step = self.script.lock().unwrap().pop_front();
        let label = format!("{} {}", request.method, request.url);
        self.sent.lock().unwrap().push(request);

        match step {
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::Held(held, response)) => {
                let _ = held.await;
                Ok(response)
            }
            Some(Step::Unreachable) => {
                Err(TransportError::Connection("connection refused".to_string()))
            }
            None => panic!("no scripted response for {label}"),
        }
    }
}

pub(crate) fn identity_json(id: i64, email: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "firstName": "Ana",
        "lastName": "Lee",
        "emailNotificationsEnabled": false
    })
}

pub(crate) fn skill_json(id: i64, category: &str, level: u8) -> Value {
    json!({
        "id": id,
        "name": format!("skill-{id}"),
        "category": category,
        "description": null,
        "level": level,
        "levelName": "",
        "createdAt": "2025-01-01T00:00:00Z",
        "lastUpdated": format!("2025-01-{:02}T00:00:00Z", (id % 28) + 1)
    })
}

pub(crate) fn grant_json(token: &str, id: i64, email: &str) -> Value {
    json!({"token": token, "user": identity_json(id, email)})
}
