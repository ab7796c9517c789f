//! ICE server list assembly.
//!
//! Clients receive this list on join and via `GET /ice-servers`. STUN is
//! always present; a TURN entry is appended when configured.

use secrecy::ExposeSecret;

use crate::config::Config;
use crate::protocol::IceServer;

/// Public STUN servers handed to every client.
pub const DEFAULT_STUN_SERVERS: [&str; 2] = [
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
];

/// Build the ICE server list from configuration.
#[must_use]
pub fn ice_servers(config: &Config) -> Vec<IceServer> {
    let mut servers: Vec<IceServer> = DEFAULT_STUN_SERVERS
        .iter()
        .map(|urls| IceServer {
            urls: (*urls).to_string(),
            username: None,
            credential: None,
        })
        .collect();

    if config.turn_enabled && !config.turn_url.is_empty() {
        servers.push(IceServer {
            urls: config.turn_url.clone(),
            username: Some(config.turn_username.clone()),
            credential: Some(config.turn_credential.expose_secret().to_string()),
        });
    }

    servers
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_stun_only_without_turn() {
        let config = Config::from_vars(&HashMap::new()).unwrap();

        let servers = ice_servers(&config);

        assert_eq!(servers.len(), 2);
        assert!(servers.iter().all(|s| s.urls.starts_with("stun:")));
        assert!(servers.iter().all(|s| s.credential.is_none()));
    }

    #[test]
    fn test_turn_appended_with_credentials() {
        let vars = HashMap::from([
            ("TURN_ENABLED".to_string(), "true".to_string()),
            (
                "TURN_URL".to_string(),
                "turn:turn.example.org:3478".to_string(),
            ),
            ("TURN_USERNAME".to_string(), "relay-user".to_string()),
            ("TURN_PASSWORD".to_string(), "relay-pass".to_string()),
        ]);
        let config = Config::from_vars(&vars).unwrap();

        let servers = ice_servers(&config);

        assert_eq!(servers.len(), 3);
        let turn = &servers[2];
        assert_eq!(turn.urls, "turn:turn.example.org:3478");
        assert_eq!(turn.username.as_deref(), Some("relay-user"));
        assert_eq!(turn.credential.as_deref(), Some("relay-pass"));
    }
}
