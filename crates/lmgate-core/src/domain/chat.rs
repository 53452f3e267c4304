//! Chat domain types.
//!
//! These are the shapes clients send to the gateway and the turn sequence
//! the gateway submits to a chat model. They carry no transport details.

use serde::{Deserialize, Serialize};

/// Preamble placed before every conversation submitted to a model.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant who can discuss coding.";

/// One turn of a client-supplied conversation history.
///
/// Order within a history is chronological and is never changed by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message text.
    pub content: String,
    /// `true` when the user wrote this turn, `false` for the assistant.
    pub is_user: bool,
}

impl ChatMessage {
    /// A turn written by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_user: true,
        }
    }

    /// A turn written by the assistant.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_user: false,
        }
    }
}

/// A validated chat request.
///
/// Constructed through [`ChatRequest::new`], which rejects blank messages, so
/// every value of this type is safe to submit to a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// The new user message.
    pub message: String,
    /// Prior turns, oldest first.
    pub history: Vec<ChatMessage>,
    /// Client hint; the route decides streaming, this is informational.
    pub stream: Option<bool>,
}

impl ChatRequest {
    /// Build a request, returning `None` when `message` is missing or blank.
    pub fn new(
        message: Option<String>,
        history: Vec<ChatMessage>,
        stream: Option<bool>,
    ) -> Option<Self> {
        let message = message.filter(|m| !m.trim().is_empty())?;
        Some(Self {
            message,
            history,
            stream,
        })
    }
}

/// Role of a turn submitted to a chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single turn in the sequence handed to a chat model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&ChatMessage> for ChatTurn {
    fn from(msg: &ChatMessage) -> Self {
        if msg.is_user {
            Self::user(msg.content.clone())
        } else {
            Self::assistant(msg.content.clone())
        }
    }
}

/// Build the turn sequence for a conversation.
///
/// The result is always `[system, history..., user(message)]` with history
/// replayed in the order given.
pub fn build_turns(system_prompt: &str, history: &[ChatMessage], message: &str) -> Vec<ChatTurn> {
    let mut turns = Vec::with_capacity(history.len() + 2);
    turns.push(ChatTurn::system(system_prompt));
    turns.extend(history.iter().map(ChatTurn::from));
    turns.push(ChatTurn::user(message));
    turns
}
