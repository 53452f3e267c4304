//! Subcommands and their arguments.
//!
//! Every option can also be set through an `LMGATE_*` environment variable
//! (a `.env` file is loaded first).

use clap::{Args, Subcommand};
use lmgate_core::{
    DEFAULT_BASE_PORT, DEFAULT_HOST, DEFAULT_MAX_PORT_ATTEMPTS, DEFAULT_SYSTEM_PROMPT,
    GatewaySettings,
};
use lmgate_upstream::DEFAULT_VENDOR;

/// Default upstream chat server.
pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the gateway and read start/stop/status/quit commands from stdin
    Serve(ServeArgs),

    /// List the chat models the upstream offers
    Models(UpstreamArgs),
}

/// Where chat models come from.
#[derive(Debug, Clone, Args)]
pub struct UpstreamArgs {
    /// Base URL of the OpenAI-compatible upstream server
    #[arg(long, env = "LMGATE_UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// Bearer token for the upstream server
    #[arg(long, env = "LMGATE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Vendor reported for models whose upstream entry names no owner
    #[arg(long, env = "LMGATE_VENDOR", default_value = DEFAULT_VENDOR)]
    pub vendor: String,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Start the server immediately
    #[arg(long, env = "LMGATE_AUTO_START")]
    pub auto_start: bool,

    /// Interface to bind to
    #[arg(long, env = "LMGATE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// First port to try
    #[arg(short, long, env = "LMGATE_PORT", default_value_t = DEFAULT_BASE_PORT)]
    pub port: u16,

    /// Number of consecutive ports to try
    #[arg(long, env = "LMGATE_PORT_ATTEMPTS", default_value_t = DEFAULT_MAX_PORT_ATTEMPTS)]
    pub port_attempts: u16,

    /// Preamble sent ahead of every conversation
    #[arg(long, default_value = DEFAULT_SYSTEM_PROMPT)]
    pub system_prompt: String,

    #[command(flatten)]
    pub upstream: UpstreamArgs,
}

impl ServeArgs {
    pub fn settings(&self) -> GatewaySettings {
        GatewaySettings {
            host: self.host.clone(),
            base_port: self.port,
            max_port_attempts: self.port_attempts,
            auto_start: self.auto_start,
            system_prompt: self.system_prompt.clone(),
        }
    }
}
