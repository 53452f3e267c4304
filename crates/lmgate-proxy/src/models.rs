//! HTTP request and response bodies.
//!
//! Every JSON response carries a `status` field of `"ok"` or `"error"`.
//! Domain types live in `lmgate-core`; this module handles the API mapping.

use lmgate_core::{ChatMessage, ChatRequest, ModelInfo, ModelSelectRequest};
use serde::{Deserialize, Serialize};

use crate::error::HttpError;

/// Message returned when a chat body has no usable `message` field.
pub const MESSAGE_REQUIRED: &str = "Message is required";

/// Message returned by `GET /`.
pub const RUNNING_MESSAGE: &str = "Copilot API server is running";

/// Raw body of `POST /chat` and `POST /chat/stream`.
///
/// Every field is optional at this layer so that a missing `message` maps to
/// the documented 400 rather than a generic parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequestBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
}

impl ChatRequestBody {
    /// Parse a raw body. An empty body is treated as `{}`.
    pub fn parse(bytes: &[u8]) -> Result<Self, HttpError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
            .map_err(|e| HttpError::BadRequest(format!("Invalid request body: {e}")))
    }

    /// Validate and split into the chat request and model criteria.
    pub fn into_parts(self) -> Result<(ChatRequest, ModelSelectRequest), HttpError> {
        let criteria = ModelSelectRequest::from_parts(self.vendor, self.family);
        let request = ChatRequest::new(self.message, self.history.unwrap_or_default(), self.stream)
            .ok_or_else(|| HttpError::BadRequest(MESSAGE_REQUIRED.to_string()))?;
        Ok((request, criteria))
    }
}

/// Envelope status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// Response from `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: Status,
    pub message: String,
}

impl HealthResponse {
    pub fn running() -> Self {
        Self {
            status: Status::Ok,
            message: RUNNING_MESSAGE.to_string(),
        }
    }
}

/// Response from `GET /models`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub status: Status,
    pub models: Vec<ModelInfo>,
}

impl ModelsResponse {
    pub fn new(models: Vec<ModelInfo>) -> Self {
        Self {
            status: Status::Ok,
            models,
        }
    }
}

/// Response from `POST /chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub status: Status,
    pub response: String,
}

impl ChatResponse {
    pub fn new(response: String) -> Self {
        Self {
            status: Status::Ok,
            response,
        }
    }
}

/// Error envelope used by every failing route.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: Status,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
        }
    }
}
