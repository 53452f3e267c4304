//! Gateway settings and validation.
//!
//! Pure configuration types with no infrastructure dependencies. The CLI
//! fills these from arguments and environment variables.

use serde::{Deserialize, Serialize};

use crate::domain::DEFAULT_SYSTEM_PROMPT;

/// Default host the gateway binds to.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// First port probed when starting the gateway.
pub const DEFAULT_BASE_PORT: u16 = 3000;

/// Number of consecutive ports probed before giving up.
pub const DEFAULT_MAX_PORT_ATTEMPTS: u16 = 10;

/// Gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Host (interface address) to bind to.
    pub host: String,

    /// First port to try.
    pub base_port: u16,

    /// How many ports, starting at `base_port`, to try.
    pub max_port_attempts: u16,

    /// Start the server as soon as the process launches.
    pub auto_start: bool,

    /// Preamble sent ahead of every conversation.
    pub system_prompt: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            base_port: DEFAULT_BASE_PORT,
            max_port_attempts: DEFAULT_MAX_PORT_ATTEMPTS,
            auto_start: false,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl GatewaySettings {
    /// Last port in the probe range (inclusive).
    pub fn last_port(&self) -> Option<u16> {
        self.max_port_attempts
            .checked_sub(1)
            .and_then(|offset| self.base_port.checked_add(offset))
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Port should be >= 1024 (privileged ports require root), got {0}")]
    InvalidPort(u16),

    #[error("Port attempts must be between 1 and 100, got {0}")]
    InvalidPortAttempts(u16),

    #[error("Port range starting at {base} with {attempts} attempts exceeds 65535")]
    PortRangeOverflow { base: u16, attempts: u16 },

    #[error("Host cannot be empty")]
    EmptyHost,

    #[error("System prompt cannot be empty")]
    EmptySystemPrompt,
}

/// Validate settings values.
pub fn validate_settings(settings: &GatewaySettings) -> Result<(), SettingsError> {
    if settings.host.trim().is_empty() {
        return Err(SettingsError::EmptyHost);
    }

    if settings.base_port < 1024 {
        return Err(SettingsError::InvalidPort(settings.base_port));
    }

    if !(1..=100).contains(&settings.max_port_attempts) {
        return Err(SettingsError::InvalidPortAttempts(settings.max_port_attempts));
    }

    if settings.last_port().is_none() {
        return Err(SettingsError::PortRangeOverflow {
            base: settings.base_port,
            attempts: settings.max_port_attempts,
        });
    }

    if settings.system_prompt.trim().is_empty() {
        return Err(SettingsError::EmptySystemPrompt);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GatewaySettings::default();
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.base_port, 3000);
        assert_eq!(settings.max_port_attempts, 10);
        assert!(!settings.auto_start);
        assert_eq!(settings.last_port(), Some(3009));
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_validate_privileged_port() {
        let settings = GatewaySettings {
            base_port: 80,
            ..Default::default()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::InvalidPort(80))
        );
    }

    #[test]
    fn test_validate_port_attempts() {
        let settings = GatewaySettings {
            max_port_attempts: 0,
            ..Default::default()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::InvalidPortAttempts(0))
        );
    }

    #[test]
    fn test_validate_port_range_overflow() {
        let settings = GatewaySettings {
            base_port: 65_530,
            max_port_attempts: 10,
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::PortRangeOverflow { .. })
        ));
    }

    #[test]
    fn test_validate_empty_prompt() {
        let settings = GatewaySettings {
            system_prompt: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::EmptySystemPrompt)
        );
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let settings: GatewaySettings =
            serde_json::from_str(r#"{"base_port": 4000, "auto_start": true}"#).unwrap();
        assert_eq!(settings.base_port, 4000);
        assert!(settings.auto_start);
        assert_eq!(settings.max_port_attempts, DEFAULT_MAX_PORT_ATTEMPTS);
    }
}
