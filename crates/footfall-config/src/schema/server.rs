//! Listener and per-connection transport settings.

use serde::{Deserialize, Serialize};

/// WebSocket listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u32,
    /// Seconds allowed for the WebSocket upgrade to complete.
    pub handshake_timeout_secs: u32,
    /// Seconds between server pings.
    pub ping_interval_secs: u32,
    /// Seconds to wait for any frame after a ping before dropping the peer.
    pub pong_timeout_secs: u32,
    /// Take the client address from the first `X-Forwarded-For` entry.
    /// Only enable behind a reverse proxy that sets the header.
    pub trust_forwarded_for: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".into(),
            port: 4000,
            handshake_timeout_secs: 10,
            ping_interval_secs: 30,
            pong_timeout_secs: 10,
            trust_forwarded_for: false,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
