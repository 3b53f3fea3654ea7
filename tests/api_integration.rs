//! API Client Integration Tests
//!
//! Runs the HTTP client against a local mock backend.

use mockito::{Matcher, Server};
use serde_json::json;

use planwise::api::ApiClient;
use planwise::core::{Requirements, RetryConfig, TaskStatus, UploadFile, UserInput, WizardError};

fn client(server: &Server) -> ApiClient {
    ApiClient::new(server.url()).unwrap().with_retry(RetryConfig::no_retry())
}

fn input() -> UserInput {
    UserInput {
        description: "Voice assistant".to_string(),
        requirements: Requirements {
            content: "Must support WebRTC".to_string(),
            file_type: Some("application/pdf".to_string()),
        },
        integrations: vec!["Firebase".to_string()],
        ..Default::default()
    }
}

// ============================================================================
// Extraction
// ============================================================================

#[tokio::test]
async fn test_process_document_sends_multipart_file() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/process-document")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file"; filename="spec.pdf""#.to_string()),
            Matcher::Regex("%PDF-1.4".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"text":"Must support WebRTC"}"#)
        .create_async()
        .await;

    let file = UploadFile::new("spec.pdf", b"%PDF-1.4 body".to_vec());
    let text = client(&server).process_document(&file).await.unwrap();

    assert_eq!(text, "Must support WebRTC");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_process_image_uses_image_endpoint() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/process-image")
        .with_status(200)
        .with_body(r#"{"text":"A dark dashboard with charts"}"#)
        .create_async()
        .await;

    let file = UploadFile::new("mock.png", vec![0x89, b'P', b'N', b'G']);
    let text = client(&server).process_image(&file).await.unwrap();

    assert_eq!(text, "A dark dashboard with charts");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_extraction_http_error_is_processing_error() {
    let mut server = Server::new_async().await;
    server.mock("POST", "/process-document").with_status(422).create_async().await;

    let file = UploadFile::new("notes.txt", b"hello".to_vec());
    let err = client(&server).process_document(&file).await.unwrap_err();

    match err {
        WizardError::Processing(message) => assert!(message.contains("notes.txt")),
        other => panic!("expected processing error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_extraction_bad_body_is_processing_error() {
    let mut server = Server::new_async().await;
    server.mock("POST", "/process-image").with_status(200).with_body("<html>").create_async().await;

    let file = UploadFile::new("a.png", Vec::new());
    let err = client(&server).process_image(&file).await.unwrap_err();
    assert!(matches!(err, WizardError::Processing(_)));
}

// ============================================================================
// Task generation
// ============================================================================

#[tokio::test]
async fn test_generate_tasks_sends_flattened_input() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/generate-tasks")
        .match_body(Matcher::Json(json!({
            "description": "Voice assistant",
            "requirements": "Must support WebRTC",
            "inspiration_text": "",
            "integrations": ["Firebase"],
        })))
        .with_status(200)
        .with_body(
            json!({
                "tasks": [
                    {"id": "OMN-2", "title": "Build UI", "description": "", "status": "pending", "order": 2},
                    {"id": "OMN-1", "title": "Set up auth", "status": "in-progress", "order": 1},
                    {"id": "OMN-3", "title": "Ship", "order": 3}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let tasks = client(&server).generate_tasks(&input()).await.unwrap();
    mock.assert_async().await;

    // Backend order is kept; sorting is the board's job
    let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["OMN-2", "OMN-1", "OMN-3"]);
    assert_eq!(tasks[1].status, TaskStatus::InProgress);
    assert_eq!(tasks[2].status, TaskStatus::Pending);
    assert_eq!(tasks[1].description, "");
}

#[tokio::test]
async fn test_generate_tasks_error_carries_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/generate-tasks")
        .with_status(500)
        .with_body("bad input")
        .expect(1)
        .create_async()
        .await;

    // HTTP errors are not retried even when retries are enabled
    let client = ApiClient::new(server.url()).unwrap().with_retry(RetryConfig {
        max_attempts: 3,
        initial_delay: std::time::Duration::from_millis(1),
        ..RetryConfig::default()
    });
    let err = client.generate_tasks(&input()).await.unwrap_err();

    match err {
        WizardError::Generation(message) => assert_eq!(message, "bad input"),
        other => panic!("expected generation error, got {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generate_tasks_empty_error_body_uses_status() {
    let mut server = Server::new_async().await;
    server.mock("POST", "/generate-tasks").with_status(503).create_async().await;

    let err = client(&server).generate_tasks(&input()).await.unwrap_err();
    match err {
        WizardError::Generation(message) => assert!(message.contains("503")),
        other => panic!("expected generation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_tasks_rejects_malformed_response() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/generate-tasks")
        .with_status(200)
        .with_body(r#"{"tasks":[{"title":"no id"}]}"#)
        .create_async()
        .await;

    let err = client(&server).generate_tasks(&input()).await.unwrap_err();
    assert!(matches!(err, WizardError::Generation(_)));
}

#[tokio::test]
async fn test_generate_tasks_rejects_empty_id() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/generate-tasks")
        .with_status(200)
        .with_body(r#"{"tasks":[{"id":"","title":"x","order":0}]}"#)
        .create_async()
        .await;

    let err = client(&server).generate_tasks(&input()).await.unwrap_err();
    match err {
        WizardError::Generation(message) => assert!(message.contains("empty id")),
        other => panic!("expected generation error, got {other:?}"),
    }
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Grab a free port, then close it
    let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let client = ApiClient::new(format!("http://127.0.0.1:{port}"))
        .unwrap()
        .with_retry(RetryConfig::no_retry());

    let err = client.generate_tasks(&input()).await.unwrap_err();
    assert!(matches!(err, WizardError::Transport(_)));
    assert!(err.is_transient());
}
