//! Gate Configuration

use std::time::Duration;

/// Listener and per-connection settings.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// TCP port to listen on (all interfaces)
    pub port: u16,
    /// One read deadline spans the whole exchange from connection start
    pub read_timeout: Duration,
    /// Per-write deadline
    pub write_timeout: Duration,
    /// How long `Stop` waits for in-flight connections to drain
    pub shutdown_timeout: Duration,
    /// Global cap on simultaneously handled connections
    pub max_connections: usize,
    /// Challenge length in bytes (hex-encoded on the wire)
    pub challenge_length: usize,
    /// Maximum accepted line length in bytes, terminator included
    pub max_message_size: usize,
    /// Read buffer capacity
    pub buffer_size: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
            max_connections: 100,
            challenge_length: 32,
            max_message_size: 1024,
            buffer_size: 1024,
        }
    }
}
