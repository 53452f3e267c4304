//! Integration tests for the gateway routes.
//!
//! These tests drive the router in-process against a scripted capability
//! provider.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use lmgate_core::test_utils::{FakeCapability, FakeModel};
use lmgate_core::{CapabilityClient, CapabilityError, ChatRole, ChatTurn};
use lmgate_proxy::create_router;
use serde_json::{Value, json};
use tower::ServiceExt;

fn hello_model() -> FakeModel {
    FakeModel::new("gpt-4o", "copilot", "gpt-4o").with_fragments(["Hel", "lo"])
}

fn app_with(capability: &Arc<FakeCapability>) -> Router {
    create_router(CapabilityClient::with_system_prompt(
        capability.clone(),
        "sys",
    ))
}

async fn send(app: Router, method: &str, uri: &str, body: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Split an SSE body into its decoded `data:` payloads.
fn sse_payloads(body: &str) -> Vec<Value> {
    body.split("\n\n")
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| {
            let data = chunk
                .trim_start()
                .strip_prefix("data:")
                .unwrap_or_else(|| panic!("not a data event: {chunk:?}"));
            serde_json::from_str(data.trim()).unwrap()
        })
        .collect()
}

#[tokio::test]
async fn root_reports_running() {
    let capability = Arc::new(FakeCapability::new());
    let response = send(app_with(&capability), "GET", "/", "").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "ok", "message": "Copilot API server is running"})
    );
}

#[tokio::test]
async fn models_lists_provider_models() {
    let capability = Arc::new(
        FakeCapability::new()
            .with_model(FakeModel::new("gpt-4o", "copilot", "gpt-4o").named("GPT-4o"))
            .with_model(FakeModel::new("claude", "anthropic", "claude-3")),
    );
    let response = send(app_with(&capability), "GET", "/models", "").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "status": "ok",
            "models": [
                {"id": "gpt-4o", "name": "GPT-4o", "vendor": "copilot", "family": "gpt-4o"},
                {"id": "claude", "name": "claude", "vendor": "anthropic", "family": "claude-3"}
            ]
        })
    );
}

#[tokio::test]
async fn models_provider_failure_is_500() {
    let capability = Arc::new(
        FakeCapability::new().failing_with(CapabilityError::Provider("offline".into())),
    );
    let response = send(app_with(&capability), "GET", "/models", "").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"status": "error", "message": "Capability provider error: offline"})
    );
}

#[tokio::test]
async fn invalid_messages_are_rejected_before_model_access() {
    let bodies = [
        "{}",
        r#"{"message": ""}"#,
        r#"{"message": "   "}"#,
        r#"{"history": []}"#,
        "",
    ];

    for uri in ["/chat", "/chat/stream"] {
        for body in bodies {
            let capability = Arc::new(FakeCapability::new().with_model(hello_model()));
            let response = send(app_with(&capability), "POST", uri, body).await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri} {body:?}");
            assert_eq!(
                body_json(response).await,
                json!({"status": "error", "message": "Message is required"})
            );
            assert_eq!(capability.select_calls(), 0, "{uri} {body:?}");
        }
    }
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let capability = Arc::new(FakeCapability::new().with_model(hello_model()));
    let response = send(app_with(&capability), "POST", "/chat", "{oops").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body")
    );
    assert_eq!(capability.select_calls(), 0);
}

#[tokio::test]
async fn chat_returns_concatenated_reply() {
    let model = hello_model();
    let capability = Arc::new(FakeCapability::new().with_model(model.clone()));
    let response = send(
        app_with(&capability),
        "POST",
        "/chat",
        r#"{"message":"c","history":[{"content":"a","isUser":true},{"content":"b","isUser":false}]}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "ok", "response": "Hello"})
    );

    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0],
        vec![
            ChatTurn::system("sys"),
            ChatTurn::user("a"),
            ChatTurn::assistant("b"),
            ChatTurn::user("c"),
        ]
    );
    assert_eq!(requests[0][3].role, ChatRole::User);
}

#[tokio::test]
async fn chat_without_models_is_500() {
    let capability = Arc::new(FakeCapability::new());
    let response = send(app_with(&capability), "POST", "/chat", r#"{"message":"hi"}"#).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({
            "status": "error",
            "message": CapabilityError::NoModelAvailable.to_string()
        })
    );
}

#[tokio::test]
async fn chat_send_failure_is_500() {
    let model = FakeModel::new("gpt-4o", "copilot", "gpt-4o")
        .failing_with(CapabilityError::RequestFailed("quota exceeded".into()));
    let capability = Arc::new(FakeCapability::new().with_model(model.clone()));
    let response = send(app_with(&capability), "POST", "/chat", r#"{"message":"hi"}"#).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"status": "error", "message": "Model request failed: quota exceeded"})
    );
    assert_eq!(model.requests().len(), 1);
}

#[tokio::test]
async fn chat_mid_stream_failure_is_500_not_partial_reply() {
    let model = FakeModel::new("gpt-4o", "copilot", "gpt-4o").with_script(vec![
        Ok("partial".into()),
        Err(CapabilityError::Stream("connection reset".into())),
    ]);
    let capability = Arc::new(FakeCapability::new().with_model(model));
    let response = send(app_with(&capability), "POST", "/chat", r#"{"message":"hi"}"#).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_text(response).await;
    assert!(!body.contains("partial"), "{body}");
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({"status": "error", "message": "Stream failed: connection reset"})
    );
}

#[tokio::test]
async fn chat_honours_vendor_filter() {
    let preferred = FakeModel::new("claude", "anthropic", "claude-3").with_fragments(["from claude"]);
    let capability = Arc::new(
        FakeCapability::new()
            .with_model(hello_model())
            .with_model(preferred),
    );
    let response = send(
        app_with(&capability),
        "POST",
        "/chat",
        r#"{"message":"hi","vendor":"anthropic"}"#,
    )
    .await;

    assert_eq!(
        body_json(response).await,
        json!({"status": "ok", "response": "from claude"})
    );
}

#[tokio::test]
async fn stream_sends_fragments_then_done() {
    let capability = Arc::new(FakeCapability::new().with_model(hello_model()));
    let response = send(
        app_with(&capability),
        "POST",
        "/chat/stream",
        r#"{"message":"hi"}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(headers[header::CONNECTION], "keep-alive");

    let body = body_text(response).await;
    assert!(body.ends_with("\n\n"));
    assert_eq!(
        sse_payloads(&body),
        vec![
            json!({"fragment": "Hel"}),
            json!({"fragment": "lo"}),
            json!({"done": true}),
        ]
    );
}

#[tokio::test]
async fn stream_reports_mid_stream_failure() {
    let model = FakeModel::new("gpt-4o", "copilot", "gpt-4o").with_script(vec![
        Ok("partial".into()),
        Err(CapabilityError::Stream("connection reset".into())),
    ]);
    let capability = Arc::new(FakeCapability::new().with_model(model));
    let response = send(
        app_with(&capability),
        "POST",
        "/chat/stream",
        r#"{"message":"hi"}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        sse_payloads(&body_text(response).await),
        vec![
            json!({"fragment": "partial"}),
            json!({"error": "Stream failed: connection reset"}),
        ]
    );
}

#[tokio::test]
async fn stream_without_models_sends_error_event() {
    let capability = Arc::new(FakeCapability::new());
    let response = send(
        app_with(&capability),
        "POST",
        "/chat/stream",
        r#"{"message":"hi"}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        sse_payloads(&body_text(response).await),
        vec![json!({"error": CapabilityError::NoModelAvailable.to_string()})]
    );
    assert_eq!(capability.select_calls(), 1);
}

#[tokio::test]
async fn unknown_route_is_404_envelope() {
    let capability = Arc::new(FakeCapability::new());
    let response = send(app_with(&capability), "GET", "/nope", "").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
}
