//! Signaling controller configuration.
//!
//! Configuration is loaded from environment variables. The TURN credential
//! is the only sensitive field and is redacted in Debug output.

use secrecy::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default HTTP/WebSocket bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:4000";

/// Signaling controller configuration.
///
/// Loaded from environment variables with sensible defaults. TURN is
/// optional; without it clients fall back to the built-in STUN servers.
#[derive(Clone)]
pub struct Config {
    /// HTTP/WebSocket bind address (default: "0.0.0.0:4000").
    pub bind_address: String,

    /// Whether to hand a TURN server to clients alongside STUN.
    pub turn_enabled: bool,

    /// TURN server URL, e.g. "turn:turn.example.org:3478".
    pub turn_url: String,

    /// TURN username.
    pub turn_username: String,

    /// TURN credential. Protected by `SecretString` to prevent accidental
    /// logging.
    pub turn_credential: SecretString,
}

/// Custom Debug implementation that redacts the TURN credential.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("turn_enabled", &self.turn_enabled)
            .field("turn_url", &self.turn_url)
            .field("turn_username", &self.turn_username)
            .field("turn_credential", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("SIGNALING_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let turn_enabled = vars
            .get("TURN_ENABLED")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        let turn_url = vars.get("TURN_URL").cloned().unwrap_or_default();
        let turn_username = vars.get("TURN_USERNAME").cloned().unwrap_or_default();
        let turn_credential =
            SecretString::from(vars.get("TURN_PASSWORD").cloned().unwrap_or_default());

        if turn_enabled && turn_url.is_empty() {
            return Err(ConfigError::InvalidValue(
                "TURN_ENABLED is set but TURN_URL is empty".to_string(),
            ));
        }

        Ok(Config {
            bind_address,
            turn_enabled,
            turn_url,
            turn_username,
            turn_credential,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_from_vars_defaults() {
        let vars = HashMap::new();

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert!(!config.turn_enabled);
        assert!(config.turn_url.is_empty());
        assert!(config.turn_username.is_empty());
        assert!(config.turn_credential.expose_secret().is_empty());
    }

    #[test]
    fn test_from_vars_custom_values() {
        let vars = HashMap::from([
            (
                "SIGNALING_BIND_ADDRESS".to_string(),
                "127.0.0.1:4100".to_string(),
            ),
            ("TURN_ENABLED".to_string(), "true".to_string()),
            (
                "TURN_URL".to_string(),
                "turn:turn.example.org:3478".to_string(),
            ),
            ("TURN_USERNAME".to_string(), "relay-user".to_string()),
            ("TURN_PASSWORD".to_string(), "relay-pass".to_string()),
        ]);

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.bind_address, "127.0.0.1:4100");
        assert!(config.turn_enabled);
        assert_eq!(config.turn_url, "turn:turn.example.org:3478");
        assert_eq!(config.turn_username, "relay-user");
        assert_eq!(config.turn_credential.expose_secret(), "relay-pass");
    }

    #[test]
    fn test_turn_enabled_is_case_insensitive() {
        let vars = HashMap::from([
            ("TURN_ENABLED".to_string(), "TRUE".to_string()),
            ("TURN_URL".to_string(), "turn:t.example.org".to_string()),
        ]);
        assert!(Config::from_vars(&vars).unwrap().turn_enabled);

        let vars = HashMap::from([("TURN_ENABLED".to_string(), "yes".to_string())]);
        assert!(!Config::from_vars(&vars).unwrap().turn_enabled);
    }

    #[test]
    fn test_turn_enabled_without_url_is_rejected() {
        let vars = HashMap::from([("TURN_ENABLED".to_string(), "true".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_debug_redacts_turn_credential() {
        let vars = HashMap::from([
            ("TURN_ENABLED".to_string(), "true".to_string()),
            ("TURN_URL".to_string(), "turn:t.example.org".to_string()),
            ("TURN_PASSWORD".to_string(), "super-secret".to_string()),
        ]);
        let config = Config::from_vars(&vars).expect("Config should load successfully");

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret"));
    }
}
