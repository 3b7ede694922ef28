//! Client defaults - values callers may override per call.

use serde::{Deserialize, Serialize};

/// Defaults applied by the OSC client when a caller doesn't pass its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDefaults {
    /// Query timeout in milliseconds.
    /// Default: 2000 (the liveness check's budget)
    #[serde(default = "ClientDefaults::default_timeout_ms")]
    pub timeout_ms: u64,

    /// Largest datagram the listener will accept.
    /// Default: 65507 (max UDP payload over IPv4)
    #[serde(default = "ClientDefaults::default_max_datagram")]
    pub max_datagram: usize,
}

impl ClientDefaults {
    fn default_timeout_ms() -> u64 {
        2000
    }

    fn default_max_datagram() -> usize {
        65_507
    }
}

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            timeout_ms: Self::default_timeout_ms(),
            max_datagram: Self::default_max_datagram(),
        }
    }
}
