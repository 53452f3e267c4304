//! Gateway server state snapshot.

use serde::Serialize;

/// Snapshot of the gateway listener.
///
/// `port` is only meaningful once a start has succeeded; before that it holds
/// the configured base port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerState {
    pub port: u16,
    pub listening: bool,
}

impl ServerState {
    #[must_use]
    pub const fn stopped(port: u16) -> Self {
        Self {
            port,
            listening: false,
        }
    }

    #[must_use]
    pub const fn listening(port: u16) -> Self {
        Self {
            port,
            listening: true,
        }
    }
}
