//! Integration tests for HTTP transport

use rstest::rstest;
use serde_json::json;
use skillfolio_transport::{HttpRequest, HttpTransport, Transport, TransportError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_http_request_builder() {
    let request = HttpRequest::new("GET", "https://example.com")
        .with_bearer("token123")
        .with_header("Accept", "application/json");

    assert_eq!(request.method, "GET");
    assert_eq!(request.url, "https://example.com");
    assert_eq!(request.headers.len(), 2);
    assert_eq!(
        request.headers.get("Authorization"),
        Some(&"Bearer token123".to_string())
    );
}

#[tokio::test]
async fn test_sends_headers_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/skills"))
        .and(header("authorization", "Bearer token123"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Rust", "category": "Tech", "level": 2})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let request = HttpRequest::new("POST", format!("{}/api/skills", mock_server.uri()))
        .with_bearer("token123")
        .with_json(&json!({"name": "Rust", "category": "Tech", "level": 2}))
        .unwrap();

    let response = transport.send_http(request).await.unwrap();
    assert_eq!(response.status, 201);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["id"], 7);
}

#[rstest]
#[case(400, "Name is required")]
#[case(401, "")]
#[case(404, "Skill not found")]
#[case(500, "boom")]
#[tokio::test]
async fn test_error_status_is_a_response_not_a_transport_error(
    #[case] status: u16,
    #[case] body: &str,
) {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/skills/99"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport
        .send_http(HttpRequest::new(
            "GET",
            format!("{}/api/skills/99", mock_server.uri()),
        ))
        .await
        .unwrap();

    assert!(response.is_error());
    assert_eq!(response.status, status);
    assert_eq!(response.text(), body);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/skills"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport
        .send_http(HttpRequest::new("POST", format!("{}/api/skills", mock_server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status, 503);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_unreachable_server() {
    // Port 1 on loopback is reserved and refuses connections.
    let transport = HttpTransport::new().unwrap();
    let err = transport
        .send_http(HttpRequest::new("GET", "http://127.0.0.1:1/api/skills"))
        .await
        .unwrap_err();

    assert!(err.is_unreachable(), "expected unreachable, got {err:?}");
    assert!(matches!(err, TransportError::Connection(_)));
}
