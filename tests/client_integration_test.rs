use std::time::Duration;

use melted_trail::api::{create_client, HttpTrackerClient, TrackerApi};
use melted_trail::config::Connection;
use melted_trail::error::ApiError;
use melted_trail::model::{ChatItemKind, ChatRole, StepState};
use mockito::Matcher;

fn connection(base_url: &str) -> Connection {
    Connection::new(base_url, Duration::from_secs(5)).expect("Failed to build connection")
}

fn tracker_client(server: &mockito::ServerGuard) -> HttpTrackerClient {
    HttpTrackerClient::new(&connection(&server.url())).expect("Failed to build client")
}

#[tokio::test]
async fn test_ready_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v0/ready")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("true")
        .create_async()
        .await;

    let client = tracker_client(&server);
    let ready = client.ready().await.expect("Failed to call ready");

    assert!(ready);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ready_through_factory() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v0/ready")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("false")
        .create_async()
        .await;

    // Boxed trait object from the factory behaves like the concrete client
    let client = create_client(&connection(&server.url())).expect("Failed to create client");
    let ready = client.ready().await.expect("Failed to call ready");

    assert!(!ready);
}

#[tokio::test]
async fn test_projects_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v0/projects")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {
                    "id": "demo",
                    "name": "demo",
                    "uri": "/project/demo",
                    "last_written": "2024-06-01T10:00:00",
                    "num_apps": 3
                }
            ]"#,
        )
        .create_async()
        .await;

    let client = tracker_client(&server);
    let projects = client.projects().await.expect("Failed to list projects");

    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, "demo");
    assert_eq!(projects[0].num_apps, 3);
    // Naive datetimes from the server are read as UTC
    assert_eq!(
        projects[0].last_written.to_rfc3339(),
        "2024-06-01T10:00:00+00:00"
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_applications_encodes_project_id() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v0/my%20project/apps")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {
                    "app_id": "run-1",
                    "first_written": "2024-06-01T10:00:00",
                    "last_written": "2024-06-01T10:05:00",
                    "num_steps": 4
                }
            ]"#,
        )
        .create_async()
        .await;

    let client = tracker_client(&server);
    let apps = client
        .applications("my project")
        .await
        .expect("Failed to list applications");

    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].app_id, "run-1");
    assert_eq!(apps[0].num_steps, 4);
    // Omitted tags deserialize as an empty map
    assert!(apps[0].tags.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_steps_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v0/demo/run-1/apps")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {
                    "step_start_log": {
                        "start_time": "2024-06-01T10:00:00",
                        "action": "fetch",
                        "inputs": {"query": "hello"},
                        "sequence_id": 0
                    },
                    "step_end_log": {
                        "end_time": "2024-06-01T10:00:02",
                        "action": "fetch",
                        "result": {},
                        "exception": null,
                        "state": {},
                        "sequence_id": 0
                    },
                    "step_sequence_id": 0
                },
                {
                    "step_start_log": {
                        "start_time": "2024-06-01T10:00:02",
                        "action": "generate",
                        "inputs": {},
                        "sequence_id": 1
                    },
                    "step_end_log": null,
                    "step_sequence_id": 1
                }
            ]"#,
        )
        .create_async()
        .await;

    let client = tracker_client(&server);
    let steps = client
        .steps("demo", "run-1")
        .await
        .expect("Failed to fetch steps");

    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].action(), "fetch");
    assert_eq!(steps[0].state(), StepState::Completed);
    assert_eq!(steps[0].duration(), Some(Duration::from_secs(2)));
    assert_eq!(steps[1].action(), "generate");
    assert_eq!(steps[1].state(), StepState::Running);
    assert_eq!(steps[1].duration(), None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_create_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v0/chatbot/demo/chat-1/create")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#""chat-1""#)
        .create_async()
        .await;

    let client = tracker_client(&server);
    let created = client
        .chat_create("demo", "chat-1")
        .await
        .expect("Failed to create chat application");

    assert_eq!(created, "chat-1");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_response_sends_prompt_as_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v0/chatbot/demo/chat-1/response")
        .match_query(Matcher::UrlEncoded(
            "prompt".into(),
            "こんにちは".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"role": "user", "content": "こんにちは", "type": "text"},
                {"role": "assistant", "content": "こんにちは！", "type": "text"}
            ]"#,
        )
        .create_async()
        .await;

    let client = tracker_client(&server);
    let items = client
        .chat_response("demo", "chat-1", "こんにちは")
        .await
        .expect("Failed to send prompt");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].role, ChatRole::User);
    assert_eq!(items[1].role, ChatRole::Assistant);
    assert_eq!(items[1].content, "こんにちは！");
    assert_eq!(items[1].kind, ChatItemKind::Text);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_history_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v0/chatbot/demo/chat-1/history")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"role": "user", "content": "2 + 2 は?", "type": "text"},
                {"role": "assistant", "content": "print(2 + 2)", "type": "code"}
            ]"#,
        )
        .create_async()
        .await;

    let client = tracker_client(&server);
    let items = client
        .chat_history("demo", "chat-1")
        .await
        .expect("Failed to fetch history");

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].kind, ChatItemKind::Code);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ui_page_returns_document() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/index.html")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><body>trail</body></html>")
        .create_async()
        .await;

    let client = tracker_client(&server);
    let body = client
        .ui_page("index.html")
        .await
        .expect("Failed to fetch UI page");

    assert!(body.contains("trail"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_validation_error_is_structured() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v0/demo/run-1/apps")
        .with_status(422)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"detail": [{"loc": ["path", "project_id"], "msg": "Field required", "type": "missing"}]}"#,
        )
        .create_async()
        .await;

    let client = tracker_client(&server);
    let err = client.steps("demo", "run-1").await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.status(), Some(422));
    match err {
        ApiError::Validation(validation) => {
            assert_eq!(validation.len(), 1);
            assert_eq!(validation.detail[0].location(), "path.project_id");
            assert_eq!(validation.detail[0].msg, "Field required");
        }
        other => panic!("Validation になるはず: {other:?}"),
    }
}

#[tokio::test]
async fn test_unstructured_422_falls_back_to_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v0/projects")
        .with_status(422)
        .with_body("Unprocessable Entity")
        .create_async()
        .await;

    let client = tracker_client(&server);
    let err = client.projects().await.unwrap_err();

    assert!(!err.is_validation());
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, "Unprocessable Entity");
        }
        other => panic!("Status になるはず: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_keeps_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v0/projects")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let client = tracker_client(&server);
    let err = client.projects().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("HTTP 500"));
    assert!(err.to_string().contains("internal error"));
}

#[tokio::test]
async fn test_invalid_json_body_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v0/projects")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not json")
        .create_async()
        .await;

    let client = tracker_client(&server);
    let err = client.projects().await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_base_path_prefix_is_preserved() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/trail/api/v0/projects")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    // Reverse-proxy style base URL with a path prefix
    let base_url = format!("{}/trail/", server.url());
    let client = HttpTrackerClient::new(&connection(&base_url)).expect("Failed to build client");
    let projects = client.projects().await.expect("Failed to list projects");

    assert!(projects.is_empty());
    mock.assert_async().await;
}
