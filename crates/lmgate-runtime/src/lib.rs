//! Gateway lifecycle for lmgate.
//!
//! - [`GatewaySupervisor`] owns the single HTTP server handle: port probing,
//!   bind, graceful stop and crash detection.
//! - [`GatewayController`] maps start/stop/status commands onto the
//!   supervisor and reports outcomes through `tracing`.

#![deny(unsafe_code)]

pub mod controller;
pub mod gateway;

pub use controller::{ControlCommand, GatewayController, ParseCommandError};
pub use gateway::{
    GatewayConfig, GatewayStatus, GatewaySupervisor, LifecycleError, LifecyclePhase,
    is_port_available, probe_port,
};
