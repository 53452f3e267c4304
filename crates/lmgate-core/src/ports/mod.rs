//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from
//! infrastructure. They contain no transport details and use only domain
//! types.

pub mod capability;

pub use capability::{CapabilityError, ChatCapabilityPort, ChatModelPort, FragmentStream};

#[cfg(test)]
pub use capability::MockChatCapabilityPort;
