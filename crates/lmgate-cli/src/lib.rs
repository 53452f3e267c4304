//! Command-line front end for lmgate.
//!
//! `main.rs` is the composition root; this library holds the argument
//! definitions and command handlers so they can be tested.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used only by the binary
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

pub use commands::{Commands, ServeArgs, UpstreamArgs};
pub use error::CliError;
pub use parser::Cli;
