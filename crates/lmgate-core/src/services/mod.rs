//! Application services built on top of the ports.

mod capability_client;

pub use capability_client::CapabilityClient;
