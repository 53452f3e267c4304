//! Log output of the gateway routes.
//!
//! Each test installs a thread-local subscriber that writes formatted events
//! into a shared buffer, so the tests run on the current-thread runtime.

use std::io;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use lmgate_core::CapabilityClient;
use lmgate_core::test_utils::{FakeCapability, FakeModel};
use lmgate_proxy::create_router;
use tower::ServiceExt;
use tracing::Level;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    fn lines_at(&self, level: &str) -> Vec<String> {
        self.text()
            .lines()
            .filter(|line| line.contains(level))
            .map(str::to_owned)
            .collect()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(max_level: Level) -> (Captured, tracing::subscriber::DefaultGuard) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(max_level)
        .with_ansi(false)
        .finish();
    (captured, tracing::subscriber::set_default(subscriber))
}

async fn send(method: &str, uri: &str, body: &str) -> StatusCode {
    let capability = Arc::new(
        FakeCapability::new()
            .with_model(FakeModel::new("gpt-4o", "copilot", "gpt-4o").with_fragments(["hi"])),
    );
    create_router(CapabilityClient::new(capability))
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn requests_are_logged_at_info() {
    let (captured, _guard) = capture(Level::INFO);

    assert_eq!(send("GET", "/models", "").await, StatusCode::OK);

    let info = captured.lines_at("INFO");
    assert!(
        info.iter()
            .any(|line| line.contains("GET") && line.contains("/models")),
        "no INFO line with method and path in:\n{}",
        captured.text()
    );
}

#[tokio::test]
async fn rejected_chat_body_is_logged_at_debug() {
    let (captured, _guard) = capture(Level::DEBUG);

    assert_eq!(send("POST", "/chat", "{}").await, StatusCode::BAD_REQUEST);
    assert_eq!(
        send("POST", "/chat/stream", r#"{"message":" "}"#).await,
        StatusCode::BAD_REQUEST
    );

    let rejected: Vec<_> = captured
        .lines_at("DEBUG")
        .into_iter()
        .filter(|line| line.contains("Rejected chat request: Message is required"))
        .collect();
    assert_eq!(rejected.len(), 2, "{}", captured.text());
}

#[tokio::test]
async fn rejected_chat_body_is_silent_at_info() {
    let (captured, _guard) = capture(Level::INFO);

    assert_eq!(send("POST", "/chat", "{oops").await, StatusCode::BAD_REQUEST);

    assert!(!captured.text().contains("Rejected chat request"));
}
