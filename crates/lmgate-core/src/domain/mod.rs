//! Domain types shared by every lmgate crate.

mod chat;
mod model;
mod server;

pub use chat::{
    ChatMessage, ChatRequest, ChatRole, ChatTurn, DEFAULT_SYSTEM_PROMPT, build_turns,
};
pub use model::{ModelInfo, ModelSelectRequest};
pub use server::ServerState;
