//! HTTP contract tests against a mock evaluation service
//!
//! These tests verify the requests the client sends and how responses,
//! error bodies and slow replies are mapped.

use rag_optimizer::client::{ClientError, EvaluationBackend, HttpEvaluationClient, Timeouts};
use rag_optimizer::documents::{DocumentFile, DocumentKind};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpEvaluationClient {
    HttpEvaluationClient::new(&server.uri(), Timeouts::default()).unwrap()
}

fn summary_body() -> Value {
    json!({
        "results": [],
        "winner": "pipeline_b",
        "summary": {
            "pipeline_a": {
                "avg_accuracy": 7.5,
                "avg_relevance": 8.0,
                "avg_completeness": 7.0,
                "avg_cost": 0.00042,
                "composite_score": 80.0
            },
            "pipeline_b": {
                "avg_accuracy": 8.5,
                "avg_relevance": 9.0,
                "avg_completeness": 8.0,
                "avg_cost": 0.00051,
                "composite_score": 92.0
            }
        }
    })
}

#[tokio::test]
async fn test_upload_sends_multipart_files() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Uploaded 2 files",
            "files": ["guide.pdf", "notes.txt"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let files = vec![
        DocumentFile::new("guide.pdf", b"%PDF-1.7 body".to_vec(), DocumentKind::Pdf),
        DocumentFile::new("notes.txt", "plain notes", DocumentKind::PlainText),
    ];

    let stored = client_for(&server).upload(&files).await.unwrap();
    assert_eq!(stored, vec!["guide.pdf".to_string(), "notes.txt".to_string()]);

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    let content_type = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&request.body);
    assert_eq!(body.matches("name=\"files\"").count(), 2);
    assert!(body.contains("filename=\"guide.pdf\""));
    assert!(body.to_lowercase().contains("content-type: application/pdf"));
    assert!(body.contains("filename=\"notes.txt\""));
    assert!(body.contains("plain notes"));
}

#[tokio::test]
async fn test_ingest_posts_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Ingestion complete",
            "pipelines": ["pipeline_a", "pipeline_b"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client_for(&server).ingest().await.unwrap();

    assert_eq!(ack.pipelines.len(), 2);
    assert_eq!(ack.message.as_deref(), Some("Ingestion complete"));
}

#[tokio::test]
async fn test_ingest_accepts_empty_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client_for(&server).ingest().await.unwrap();

    assert!(ack.message.is_none());
    assert!(ack.pipelines.is_empty());
}

#[tokio::test]
async fn test_ingest_ignores_unexpected_acknowledgement_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "pipelines": { "pipeline_a": "ready" }
        })))
        .mount(&server)
        .await;

    let ack = client_for(&server).ingest().await.unwrap();

    assert!(ack.pipelines.is_empty());
}

#[tokio::test]
async fn test_evaluate_sends_test_questions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/evaluate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_body()))
        .expect(1)
        .mount(&server)
        .await;

    let questions = vec!["What is X?".to_string(), "Who wrote Y?".to_string()];
    let response = client_for(&server).evaluate(&questions).await.unwrap();

    let keys: Vec<&str> = response.summary.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["pipeline_a", "pipeline_b"]);
    assert_eq!(response.winner.unwrap().as_str(), "pipeline_b");

    let request = &server.received_requests().await.unwrap()[0];
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body, json!({ "test_questions": ["What is X?", "Who wrote Y?"] }));
}

#[tokio::test]
async fn test_error_detail_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "No documents uploaded" })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).ingest().await.unwrap_err();

    assert_eq!(
        err,
        ClientError::Api {
            status_code: 400,
            detail: Some("No documents uploaded".to_string()),
        }
    );
    assert_eq!(err.detail(), Some("No documents uploaded"));
}

#[tokio::test]
async fn test_plain_text_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/evaluate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .evaluate(&["q".to_string()])
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(500));
    assert_eq!(err.detail(), Some("Internal Server Error"));
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/evaluate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .evaluate(&["q".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_slow_evaluate_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/evaluate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(summary_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let timeouts = Timeouts {
        evaluate: Duration::from_millis(200),
        ..Timeouts::default()
    };
    let client = HttpEvaluationClient::new(&server.uri(), timeouts).unwrap();

    let err = client.evaluate(&["q".to_string()]).await.unwrap_err();

    assert!(err.is_timeout());
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_unreachable_service() {
    // bind then release a port so nothing is listening on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let uri = format!("http://127.0.0.1:{}", port);
    let client = HttpEvaluationClient::new(&uri, Timeouts::default()).unwrap();
    let err = client.health().await.unwrap_err();

    assert!(err.is_transport());
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_health_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "api_key_loaded": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents_uploaded": 2,
            "pipelines_ready": true
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let health = client.health().await.unwrap();
    let status = client.status().await.unwrap();

    assert!(health.is_healthy());
    assert_eq!(health.api_key_loaded, Some(true));
    assert_eq!(status.documents_uploaded, 2);
    assert!(status.pipelines_ready);
}

#[tokio::test]
async fn test_base_url_with_path_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ingest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        HttpEvaluationClient::new(&format!("{}/api/", server.uri()), Timeouts::default()).unwrap();

    client.ingest().await.unwrap();
}
