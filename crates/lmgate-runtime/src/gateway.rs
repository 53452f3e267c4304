//! Gateway supervisor for managing the HTTP server lifecycle.
//!
//! The `GatewaySupervisor` owns the server handle internally, using
//! `tokio::sync::Mutex` for async-safe access. Callers (the controller, the
//! CLI) never store handles themselves.
//!
//! Starting probes `base..base+attempts` for a free port and binds the real
//! listener there. Stopping cancels the server and gives it a grace period
//! before the task is aborted. A task that exits without a stop request is
//! reported once as `Crashed`. Phase transitions are published on a `watch`
//! channel.

use std::fmt;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use anyhow::Result as AnyResult;
use lmgate_core::{CapabilityClient, GatewaySettings, ServerState};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How long `stop()` waits for graceful shutdown before aborting the task.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// The spawned server task and the token that ends it.
struct GatewayHandle {
    cancel_token: CancellationToken,
    join_handle: JoinHandle<AnyResult<()>>,
    bound_addr: SocketAddr,
}

impl GatewayHandle {
    fn spawn(listener: TcpListener, bound_addr: SocketAddr, client: CapabilityClient) -> Self {
        let cancel_token = CancellationToken::new();
        let shutdown = cancel_token.clone();
        let join_handle = tokio::spawn(async move {
            debug!(addr = %bound_addr, "Gateway task starting");
            lmgate_proxy::serve(listener, client, shutdown).await
        });
        Self {
            cancel_token,
            join_handle,
            bound_addr,
        }
    }

    fn is_running(&self) -> bool {
        !self.join_handle.is_finished()
    }

    /// Cancel the server and wait up to `grace` for it to drain.
    async fn shutdown(self, grace: Duration) -> Result<SocketAddr, LifecycleError> {
        let Self {
            cancel_token,
            mut join_handle,
            bound_addr,
        } = self;

        cancel_token.cancel();
        if let Ok(joined) = tokio::time::timeout(grace, &mut join_handle).await {
            return task_outcome(joined).map(|()| bound_addr);
        }
        join_handle.abort();
        Err(LifecycleError::ShutdownTimeout(grace))
    }
}

/// Flatten a joined server task into a lifecycle result.
fn task_outcome(joined: Result<AnyResult<()>, JoinError>) -> Result<(), LifecycleError> {
    joined
        .map_err(|e| LifecycleError::TaskFailed(e.to_string()))?
        .map_err(|e| LifecycleError::TaskFailed(format!("{e:#}")))
}

/// Lifecycle phase, published on the supervisor's watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Stopped,
    Starting,
    Listening,
    Stopping,
}

/// Status of the gateway server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayStatus {
    /// Server is not running.
    Stopped,
    /// Server is running and listening.
    Listening {
        /// Address the server is listening on.
        address: SocketAddr,
    },
    /// Server started but finished without being stopped.
    Crashed,
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "Stopped"),
            Self::Listening { address } => write!(f, "Listening on {address}"),
            Self::Crashed => write!(f, "Crashed"),
        }
    }
}

/// Error from supervisor operations.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Server is already running.
    #[error("Server is already running on {0}")]
    AlreadyRunning(SocketAddr),

    /// Every port in the probe range was taken.
    #[error("No available port found after {attempts} attempts starting from {base}")]
    NoPortAvailable { base: u16, attempts: u16 },

    /// Failed to bind to a probed address.
    #[error("Failed to bind to {address}: {reason}")]
    BindFailed { address: String, reason: String },

    /// The server task returned an error or panicked.
    #[error("Server task failed: {0}")]
    TaskFailed(String),

    /// The server did not drain within the grace period and was aborted.
    #[error("Server did not shut down within {0:?}; task aborted")]
    ShutdownTimeout(Duration),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Host to bind to.
    pub host: String,
    /// First port probed.
    pub base_port: u16,
    /// Number of consecutive ports probed.
    pub max_port_attempts: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from(&GatewaySettings::default())
    }
}

impl From<&GatewaySettings> for GatewayConfig {
    fn from(settings: &GatewaySettings) -> Self {
        Self {
            host: settings.host.clone(),
            base_port: settings.base_port,
            max_port_attempts: settings.max_port_attempts,
        }
    }
}

/// Check if a port is available by attempting to bind to it.
///
/// The listener is dropped immediately, releasing the port.
pub fn is_port_available(host: &str, port: u16) -> bool {
    StdTcpListener::bind((host, port)).is_ok_and(|listener| listener.local_addr().is_ok())
}

/// Find the first free port in `base..base + attempts`.
pub fn probe_port(host: &str, base: u16, attempts: u16) -> Result<u16, LifecycleError> {
    for offset in 0..attempts {
        let Some(port) = base.checked_add(offset) else {
            break;
        };
        if is_port_available(host, port) {
            debug!(port, attempt = offset + 1, "Found available port");
            return Ok(port);
        }
        debug!(port, "Port in use, trying next");
    }

    Err(LifecycleError::NoPortAvailable { base, attempts })
}

/// Supervisor for the gateway HTTP server.
///
/// # Example
///
/// ```ignore
/// let supervisor = GatewaySupervisor::new(GatewayConfig::default());
/// let addr = supervisor.start(client).await?;
/// println!("Status: {}", supervisor.status().await);
/// supervisor.stop().await?;
/// ```
pub struct GatewaySupervisor {
    config: GatewayConfig,
    /// Internal state protected by async mutex.
    handle: Mutex<Option<GatewayHandle>>,
    /// Last successfully bound port, or the base port before the first start.
    last_port: AtomicU16,
    phase: watch::Sender<LifecyclePhase>,
}

impl Default for GatewaySupervisor {
    fn default() -> Self {
        Self::new(GatewayConfig::default())
    }
}

impl GatewaySupervisor {
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        let (phase, _) = watch::channel(LifecyclePhase::Stopped);
        Self {
            last_port: AtomicU16::new(config.base_port),
            config,
            handle: Mutex::new(None),
            phase,
        }
    }

    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Subscribe to lifecycle phase changes.
    pub fn subscribe(&self) -> watch::Receiver<LifecyclePhase> {
        self.phase.subscribe()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        *self.phase.borrow()
    }

    /// Port of the current or most recent listener.
    pub fn port(&self) -> u16 {
        self.last_port.load(Ordering::SeqCst)
    }

    /// Start the gateway server.
    ///
    /// Probes for a free port, binds it, then spawns the server task. While a
    /// server is running the call is rejected and the running listener is
    /// left untouched.
    pub async fn start(&self, client: CapabilityClient) -> Result<SocketAddr, LifecycleError> {
        let mut slot = self.handle.lock().await;

        if let Some(running) = slot.as_ref().filter(|h| h.is_running()) {
            return Err(LifecycleError::AlreadyRunning(running.bound_addr));
        }
        if let Some(finished) = slot.take() {
            if let Err(e) = task_outcome(finished.join_handle.await) {
                warn!("Previous gateway task: {e}");
            }
        }

        self.phase.send_replace(LifecyclePhase::Starting);
        let listener = match self.bind().await {
            Ok(listener) => listener,
            Err(e) => {
                self.phase.send_replace(LifecyclePhase::Stopped);
                return Err(e);
            }
        };

        let bound_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                self.phase.send_replace(LifecyclePhase::Stopped);
                return Err(LifecycleError::Internal(format!(
                    "Failed to get local address: {e}"
                )));
            }
        };
        info!("Gateway bound to {bound_addr}");

        *slot = Some(GatewayHandle::spawn(listener, bound_addr, client));
        self.last_port.store(bound_addr.port(), Ordering::SeqCst);
        self.phase.send_replace(LifecyclePhase::Listening);

        Ok(bound_addr)
    }

    async fn bind(&self) -> Result<TcpListener, LifecycleError> {
        let host = self.config.host.as_str();
        let port = probe_port(host, self.config.base_port, self.config.max_port_attempts)?;

        TcpListener::bind((host, port))
            .await
            .map_err(|e| LifecycleError::BindFailed {
                address: format!("{host}:{port}"),
                reason: e.to_string(),
            })
    }

    /// Stop the gateway server.
    ///
    /// Returns the address that was stopped, or `None` if nothing was
    /// running. A server still draining after the grace period is aborted
    /// and reported as [`LifecycleError::ShutdownTimeout`].
    pub async fn stop(&self) -> Result<Option<SocketAddr>, LifecycleError> {
        let mut slot = self.handle.lock().await;
        let Some(handle) = slot.take() else {
            debug!("Stop requested but gateway is not running");
            return Ok(None);
        };

        info!("Stopping gateway on {}", handle.bound_addr);
        self.phase.send_replace(LifecyclePhase::Stopping);
        let stopped = handle.shutdown(STOP_TIMEOUT).await;
        self.phase.send_replace(LifecyclePhase::Stopped);
        stopped.map(Some)
    }

    /// Current status of the server.
    ///
    /// A task that exited without a stop request is reported once as
    /// `Crashed`; the slot is then cleared.
    pub async fn status(&self) -> GatewayStatus {
        let mut slot = self.handle.lock().await;
        if let Some(running) = slot.as_ref().filter(|h| h.is_running()) {
            return GatewayStatus::Listening {
                address: running.bound_addr,
            };
        }
        let Some(finished) = slot.take() else {
            return GatewayStatus::Stopped;
        };
        self.phase.send_replace(LifecyclePhase::Stopped);

        let stop_requested = finished.cancel_token.is_cancelled();
        match task_outcome(finished.join_handle.await) {
            _ if stop_requested => GatewayStatus::Stopped,
            Ok(()) => {
                warn!("Gateway task exited without a stop request");
                GatewayStatus::Crashed
            }
            Err(e) => {
                warn!("Gateway crashed: {e}");
                GatewayStatus::Crashed
            }
        }
    }

    /// Snapshot of the listener state.
    pub async fn state(&self) -> ServerState {
        match self.status().await {
            GatewayStatus::Listening { address } => ServerState::listening(address.port()),
            GatewayStatus::Stopped | GatewayStatus::Crashed => ServerState::stopped(self.port()),
        }
    }
}

impl fmt::Debug for GatewaySupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewaySupervisor")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
