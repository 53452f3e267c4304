//! Axum HTTP server for the chat gateway.
//!
//! This module provides the router and the `serve()` function that runs it
//! on a pre-bound `TcpListener` (from the supervisor).

use axum::{
    Json, Router,
    extract::State,
    http::Uri,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use lmgate_core::{CapabilityClient, ChatRequest, ModelSelectRequest};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, error, info};
use uuid::Uuid;

use crate::bridge::{chat_events, sse_response};
use crate::error::HttpError;
use crate::models::{ChatRequestBody, ChatResponse, HealthResponse, ModelsResponse};

/// Shared application state for the gateway.
#[derive(Clone)]
struct AppState {
    /// Chat capability access.
    client: CapabilityClient,
}

/// Build the gateway router.
///
/// Routes:
/// - `GET /` - liveness message
/// - `GET /models` - available chat models
/// - `POST /chat` - full reply as JSON
/// - `POST /chat/stream` - reply as Server-Sent Events
///
/// CORS is fully permissive. Every request is logged at `INFO` with its
/// method and path.
pub fn create_router(client: CapabilityClient) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/models", get(list_models))
        .route("/chat", post(chat))
        .route("/chat/stream", post(chat_stream))
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(AppState { client })
}

/// Run the gateway with a pre-bound listener until `cancel` is triggered.
///
/// Returns `Ok(())` on clean shutdown, or an error if the server fails.
pub async fn serve(
    listener: TcpListener,
    client: CapabilityClient,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Gateway listening on http://{addr}");

    axum::serve(listener, create_router(client))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Gateway server shut down");
    Ok(())
}

async fn root() -> Json<HealthResponse> {
    Json(HealthResponse::running())
}

async fn list_models(State(state): State<AppState>) -> Result<Json<ModelsResponse>, HttpError> {
    debug!("GET /models");

    let models = state.client.list_models().await.map_err(|e| {
        error!("Error getting models: {e}");
        HttpError::from(e)
    })?;
    Ok(Json(ModelsResponse::new(models)))
}

/// Parse and validate a chat body. Rejections are logged at debug level only.
fn parse_chat_body(body: &[u8]) -> Result<(ChatRequest, ModelSelectRequest), HttpError> {
    ChatRequestBody::parse(body)
        .and_then(ChatRequestBody::into_parts)
        .inspect_err(|e| debug!("Rejected chat request: {e}"))
}

async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<ChatResponse>, HttpError> {
    let (request, criteria) = parse_chat_body(&body)?;
    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        history_len = request.history.len(),
        "Processing chat request"
    );

    let response = state
        .client
        .converse_complete(&request.message, &request.history, &criteria)
        .await
        .map_err(|e| {
            error!(%request_id, "Error in chat endpoint: {e}");
            HttpError::from(e)
        })?;

    debug!(%request_id, response_len = response.len(), "Chat request complete");
    Ok(Json(ChatResponse::new(response)))
}

async fn chat_stream(State(state): State<AppState>, body: Bytes) -> Result<Response, HttpError> {
    let (request, criteria) = parse_chat_body(&body)?;
    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        history_len = request.history.len(),
        "Processing streaming chat request"
    );

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let client = state.client;
    let start = async move {
        client
            .converse(&request.message, &request.history, &criteria, token)
            .await
    };

    Ok(sse_response(chat_events(start, cancel)))
}

async fn not_found(uri: Uri) -> HttpError {
    debug!("No route for {uri}");
    HttpError::NotFound(format!("Not found: {}", uri.path()))
}
