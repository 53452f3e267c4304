//! HTTP gateway for lmgate.
//!
//! Exposes chat models behind a small JSON + Server-Sent Events API. The
//! router is transport-only: model access goes through
//! [`lmgate_core::CapabilityClient`].

#![deny(unsafe_code)]

pub mod bridge;
pub mod error;
pub mod models;
pub mod server;

pub use bridge::StreamEvent;
pub use error::HttpError;
pub use server::{create_router, serve};
