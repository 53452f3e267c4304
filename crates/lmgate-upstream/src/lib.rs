//! OpenAI-compatible capability adapter for lmgate.
//!
//! Implements [`lmgate_core::ChatCapabilityPort`] on top of an upstream HTTP
//! server that speaks the OpenAI chat completions API.

#![deny(unsafe_code)]

pub mod client;
pub mod models;
pub mod sse;

pub use client::{DEFAULT_VENDOR, OpenAiCompatCapability, UpstreamConfig, UpstreamError};
