//! Start/stop/status command handling.
//!
//! `GatewayController` is the single place that turns user commands into
//! supervisor calls. Outcomes are reported through `tracing`; failures are
//! logged once and never retried.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use lmgate_core::CapabilityClient;
use tracing::{error, info};

use crate::gateway::{GatewayStatus, GatewaySupervisor, LifecycleError};

/// A user command for the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Stop,
    Status,
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Status => "status",
        })
    }
}

/// Text that does not name a [`ControlCommand`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown command '{0}' (expected start, stop or status)")]
pub struct ParseCommandError(pub String);

impl FromStr for ControlCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "status" => Ok(Self::Status),
            _ => Err(ParseCommandError(s.trim().to_string())),
        }
    }
}

/// Maps commands onto a [`GatewaySupervisor`].
#[derive(Debug, Clone)]
pub struct GatewayController {
    supervisor: Arc<GatewaySupervisor>,
    client: CapabilityClient,
    auto_start: bool,
}

impl GatewayController {
    pub const fn new(supervisor: Arc<GatewaySupervisor>, client: CapabilityClient) -> Self {
        Self {
            supervisor,
            client,
            auto_start: false,
        }
    }

    /// Start the server from [`launch`](Self::launch).
    #[must_use]
    pub const fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    pub const fn supervisor(&self) -> &Arc<GatewaySupervisor> {
        &self.supervisor
    }

    /// Run launch-time actions. Starts the server when auto-start is set.
    pub async fn launch(&self) {
        if self.auto_start {
            info!("Auto-starting gateway");
            self.start().await;
        }
    }

    /// Execute a command and return the resulting status.
    pub async fn execute(&self, command: ControlCommand) -> GatewayStatus {
        match command {
            ControlCommand::Start => self.start().await,
            ControlCommand::Stop => self.stop().await,
            ControlCommand::Status => {
                let status = self.supervisor.status().await;
                info!("Gateway status: {status}");
            }
        }
        self.supervisor.status().await
    }

    /// Start the server if it is not already running.
    pub async fn start(&self) {
        match self.supervisor.start(self.client.clone()).await {
            Ok(addr) => info!("API server started on port {}", addr.port()),
            Err(LifecycleError::AlreadyRunning(addr)) => {
                info!("API server is already running on port {}", addr.port());
            }
            Err(e) => error!("Failed to start server: {e}"),
        }
    }

    /// Stop the server if it is running.
    pub async fn stop(&self) {
        match self.supervisor.stop().await {
            Ok(Some(_)) => info!("API server stopped"),
            Ok(None) => info!("API server is not running"),
            Err(e) => error!("Failed to stop server: {e}"),
        }
    }

    /// Stop the server on process exit.
    pub async fn shutdown(&self) {
        if let Err(e) = self.supervisor.stop().await {
            error!("Failed to stop server during shutdown: {e}");
        }
    }
}
