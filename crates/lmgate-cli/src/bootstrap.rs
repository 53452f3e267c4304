//! Wiring of the upstream adapter into a capability client.

use std::sync::Arc;

use lmgate_core::{CapabilityClient, DEFAULT_SYSTEM_PROMPT};
use lmgate_upstream::{OpenAiCompatCapability, UpstreamConfig};
use tracing::debug;

use crate::commands::UpstreamArgs;
use crate::error::CliError;

/// Build a capability client backed by the configured upstream.
pub fn build_client(
    args: &UpstreamArgs,
    system_prompt: Option<&str>,
) -> Result<CapabilityClient, CliError> {
    let config = UpstreamConfig::new(args.upstream_url.clone())
        .with_api_key(args.api_key.clone())
        .with_default_vendor(args.vendor.clone());
    let adapter = OpenAiCompatCapability::new(config)?;
    debug!(upstream = %args.upstream_url, "Upstream adapter ready");

    Ok(CapabilityClient::with_system_prompt(
        Arc::new(adapter),
        system_prompt.unwrap_or(DEFAULT_SYSTEM_PROMPT),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(url: &str) -> UpstreamArgs {
        UpstreamArgs {
            upstream_url: url.into(),
            api_key: None,
            vendor: "local".into(),
        }
    }

    #[test]
    fn test_rejects_non_http_upstream() {
        let err = build_client(&args("localhost:8080"), None).unwrap_err();
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn test_uses_given_prompt() {
        let client = build_client(&args("http://127.0.0.1:8080"), Some("be brief")).unwrap();
        assert_eq!(client.system_prompt(), "be brief");
    }
}
