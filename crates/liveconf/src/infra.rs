//! Infrastructure configuration - where the peer lives and how we log.

use serde::{Deserialize, Serialize};

/// Network endpoints for the OSC peer.
///
/// The peer (AbletonOSC inside Live) listens on `send_port` and replies to
/// `listen_port` on this host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerConfig {
    /// Host running Live.
    /// Default: 127.0.0.1
    #[serde(default = "PeerConfig::default_host")]
    pub host: String,

    /// UDP port the peer receives on.
    /// Default: 11000
    #[serde(default = "PeerConfig::default_send_port")]
    pub send_port: u16,

    /// Local address to bind for replies.
    /// Default: 0.0.0.0
    #[serde(default = "PeerConfig::default_listen_host")]
    pub listen_host: String,

    /// Local UDP port the peer replies to.
    /// Default: 11001
    #[serde(default = "PeerConfig::default_listen_port")]
    pub listen_port: u16,
}

impl PeerConfig {
    fn default_host() -> String {
        "127.0.0.1".to_string()
    }

    fn default_send_port() -> u16 {
        11000
    }

    fn default_listen_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_listen_port() -> u16 {
        11001
    }

    /// `host:send_port`, suitable for `SocketAddr` parsing.
    pub fn send_addr(&self) -> String {
        join_host_port(&self.host, self.send_port)
    }

    /// `listen_host:listen_port`, suitable for `SocketAddr` parsing.
    pub fn listen_addr(&self) -> String {
        join_host_port(&self.listen_host, self.listen_port)
    }
}

/// IPv6 literals need brackets before a port can follow them.
fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            send_port: Self::default_send_port(),
            listen_host: Self::default_listen_host(),
            listen_port: Self::default_listen_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}
