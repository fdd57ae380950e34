use super::*;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
struct CapturedRequest {
    content_type: Option<String>,
    body: String,
}

#[derive(Clone)]
struct ExecutorState {
    execute_status: StatusCode,
    execute_body: &'static str,
    toggle_body: &'static str,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

async fn handle_execute(
    State(state): State<ExecutorState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.captured.lock().await.push(CapturedRequest {
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: String::from_utf8_lossy(&body).into_owned(),
    });
    (
        state.execute_status,
        [(header::CONTENT_TYPE, "application/json")],
        state.execute_body,
    )
}

async fn handle_logs() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"recent_logs":"INFO: blocked ip 10.0.0.7\nWARNING: failed login\n"}"#,
    )
}

async fn handle_rollback() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"result":"Rollback complete"}"#,
    )
}

async fn handle_toggle(State(state): State<ExecutorState>) -> impl IntoResponse {
    state.toggle_body
}

struct TestExecutor {
    url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

async fn spawn_executor(execute_status: StatusCode, execute_body: &'static str) -> TestExecutor {
    spawn_executor_with_toggle(execute_status, execute_body, "Safe Mode is now ON").await
}

async fn spawn_executor_with_toggle(
    execute_status: StatusCode,
    execute_body: &'static str,
    toggle_body: &'static str,
) -> TestExecutor {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let captured = Arc::new(Mutex::new(Vec::new()));
    let state = ExecutorState {
        execute_status,
        execute_body,
        toggle_body,
        captured: captured.clone(),
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = Router::new()
        .route("/execute", post(handle_execute))
        .route("/logs", get(handle_logs))
        .route("/rollback_failsafe", post(handle_rollback))
        .route("/toggle_safe_mode", get(handle_toggle))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    TestExecutor {
        url: format!("http://{addr}"),
        captured,
    }
}

const SUCCESS_BODY: &str =
    r#"{"parsed_command":{"cmd":"ls","args":["-la"]},"execution_result":"file1\nfile2"}"#;

#[tokio::test]
async fn execute_posts_exactly_one_json_request() {
    let server = spawn_executor(StatusCode::OK, SUCCESS_BODY).await;
    let client = ExecutorClient::new(&server.url).expect("client");

    client.execute("ls -la").await.expect("execute");

    let captured = server.captured.lock().await;
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].body, r#"{"command":"ls -la"}"#);
    assert_eq!(
        captured[0].content_type.as_deref(),
        Some("application/json")
    );
}

#[tokio::test]
async fn execute_sends_command_verbatim_without_trimming() {
    let server = spawn_executor(StatusCode::OK, SUCCESS_BODY).await;
    let client = ExecutorClient::new(&server.url).expect("client");

    client
        .execute("  block ip 192.168.1.100  ")
        .await
        .expect("execute");

    let captured = server.captured.lock().await;
    assert_eq!(captured[0].body, r#"{"command":"  block ip 192.168.1.100  "}"#);
}

#[tokio::test]
async fn execute_decodes_parsed_command_and_result() {
    let server = spawn_executor(StatusCode::OK, SUCCESS_BODY).await;
    let client = ExecutorClient::new(&server.url).expect("client");

    let outcome = client.execute("ls -la").await.expect("execute");

    assert_eq!(
        outcome.parsed_command,
        json!({"cmd": "ls", "args": ["-la"]})
    );
    assert_eq!(outcome.execution_result, "file1\nfile2");
}

#[tokio::test]
async fn execute_accepts_success_shape_regardless_of_status() {
    // The executor's dashboard renders any JSON body with the expected
    // shape, even on a non-2xx status. Preserved here deliberately.
    let server = spawn_executor(StatusCode::INTERNAL_SERVER_ERROR, SUCCESS_BODY).await;
    let client = ExecutorClient::new(&server.url).expect("client");

    let outcome = client.execute("show blocked").await.expect("execute");
    assert_eq!(outcome.execution_result, "file1\nfile2");
}

#[tokio::test]
async fn execute_surfaces_service_refusal() {
    let server = spawn_executor(StatusCode::FORBIDDEN, r#"{"error":"Permission denied"}"#).await;
    let client = ExecutorClient::new(&server.url).expect("client");

    let err = client
        .execute("block port 22")
        .await
        .expect_err("must refuse");
    match err {
        GatewayError::Service { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Permission denied");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn execute_rejects_non_json_body() {
    let server = spawn_executor(StatusCode::OK, "<html>oops</html>").await;
    let client = ExecutorClient::new(&server.url).expect("client");

    let err = client.execute("show logs").await.expect_err("must fail");
    match err {
        GatewayError::Decode { status, .. } => assert_eq!(status, 200),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn execute_rejects_wrong_success_shape() {
    let server = spawn_executor(StatusCode::OK, r#"{"parsed_command":{"cmd":"ls"}}"#).await;
    let client = ExecutorClient::new(&server.url).expect("client");

    let err = client.execute("ls").await.expect_err("must fail");
    assert!(matches!(err, GatewayError::Decode { .. }));
}

#[tokio::test]
async fn recent_logs_returns_joined_entries() {
    let server = spawn_executor(StatusCode::OK, SUCCESS_BODY).await;
    let client = ExecutorClient::new(&server.url).expect("client");

    let logs = client.recent_logs().await.expect("logs");
    assert_eq!(logs, "INFO: blocked ip 10.0.0.7\nWARNING: failed login\n");
}

#[tokio::test]
async fn rollback_failsafe_returns_result_text() {
    let server = spawn_executor(StatusCode::OK, SUCCESS_BODY).await;
    let client = ExecutorClient::new(&server.url).expect("client");

    let result = client.rollback_failsafe().await.expect("rollback");
    assert_eq!(result, "Rollback complete");
}

#[tokio::test]
async fn toggle_safe_mode_parses_plain_text_reply() {
    let server =
        spawn_executor_with_toggle(StatusCode::OK, SUCCESS_BODY, "Safe Mode is now OFF").await;
    let client = ExecutorClient::new(&server.url).expect("client");

    let mode = client.toggle_safe_mode().await.expect("toggle");
    assert_eq!(mode, SafeMode::Off);
}

#[tokio::test]
async fn toggle_safe_mode_rejects_unrecognized_reply() {
    let server = spawn_executor_with_toggle(StatusCode::OK, SUCCESS_BODY, "Unauthorized").await;
    let client = ExecutorClient::new(&server.url).expect("client");

    let err = client.toggle_safe_mode().await.expect_err("must fail");
    assert!(matches!(err, GatewayError::SafeModeText { .. }));
}

#[test]
fn normalize_adds_http_scheme_and_trailing_slash() {
    let url = normalize_server_url("127.0.0.1:5000").expect("normalize");
    assert_eq!(url.as_str(), "http://127.0.0.1:5000/");
}

#[test]
fn normalize_preserves_https_scheme() {
    let url = normalize_server_url("https://fw.example.com").expect("normalize");
    assert_eq!(url.scheme(), "https");
}

#[test]
fn normalize_keeps_path_prefix_joinable() {
    let url = normalize_server_url("http://fw.example.com/api").expect("normalize");
    assert_eq!(
        url.join("execute").expect("join").as_str(),
        "http://fw.example.com/api/execute"
    );
}

#[test]
fn normalize_rejects_empty_and_unparseable_urls() {
    assert!(matches!(
        normalize_server_url("   "),
        Err(GatewayError::EmptyServerUrl)
    ));
    assert!(normalize_server_url("http://").is_err());
}
