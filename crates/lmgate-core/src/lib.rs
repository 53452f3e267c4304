//! Core domain types, capability ports and services for lmgate.
//!
//! This crate knows nothing about HTTP or sockets. Adapters implement
//! [`ports::ChatCapabilityPort`]; the proxy and runtime crates consume
//! [`services::CapabilityClient`].

pub mod domain;
pub mod ports;
pub mod services;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use domain::{
    ChatMessage, ChatRequest, ChatRole, ChatTurn, DEFAULT_SYSTEM_PROMPT, ModelInfo,
    ModelSelectRequest, ServerState, build_turns,
};
pub use ports::{CapabilityError, ChatCapabilityPort, ChatModelPort, FragmentStream};
pub use services::CapabilityClient;
pub use settings::{
    DEFAULT_BASE_PORT, DEFAULT_HOST, DEFAULT_MAX_PORT_ATTEMPTS, GatewaySettings, SettingsError,
    validate_settings,
};

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;
