//! CLI-specific error types and exit codes.

use lmgate_core::{CapabilityError, SettingsError};
use lmgate_upstream::UpstreamError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid settings.
    #[error("Configuration error: {0}")]
    Config(#[from] SettingsError),

    /// Upstream adapter could not be built.
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Model access failed.
    #[error("{0}")]
    Capability(#[from] CapabilityError),
}

impl CliError {
    /// Exit code, following sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Upstream(UpstreamError::InvalidUrl(_)) => 78, // EX_CONFIG
            Self::Upstream(_) => 69,                                               // EX_UNAVAILABLE
            Self::Capability(_) => 1,
        }
    }
}
