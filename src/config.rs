//! Environment-driven server configuration

use std::net::SocketAddr;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket server binds to
    pub bind_addr: SocketAddr,
    /// Seconds each player has to take a candy before forfeiting the game
    pub turn_seconds: i32,
}

impl ServerConfig {
    /// Load config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let port = std::env::var("BONBON_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let turn_seconds = std::env::var("BONBON_TURN_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&s: &i32| s > 0)
            .unwrap_or(30);

        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            turn_seconds,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            turn_seconds: 30,
        }
    }
}
