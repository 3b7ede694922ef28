//! Errors surfaced by the OSC client.
//!
//! Every failure is reported from the call that caused it. Nothing here is
//! retried by the client; retry and backoff belong to the caller.

use std::time::Duration;

use crate::packet::PacketError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The channel itself failed: bind, send, or a send on a closed client.
    #[error("Transport error on {target}: {source}")]
    Transport {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// No correlated reply arrived before the deadline.
    #[error("No reply on {address} within {timeout:?}")]
    Timeout { address: String, timeout: Duration },

    /// Another query on the same address is still waiting for its reply.
    #[error("Query already in flight on {address}")]
    Busy { address: String },

    /// The client was closed before, or while, the query was waiting.
    #[error("Connection closed while querying {address}")]
    ConnectionClosed { address: String },

    /// The outbound message could not be encoded.
    #[error("Failed to encode message for {address}: {source}")]
    Encode {
        address: String,
        #[source]
        source: PacketError,
    },

    /// A configured endpoint could not be resolved to a socket address.
    #[error("Invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// A configured value the client cannot work with.
    #[error("Invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl ClientError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ClientError::Busy { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ClientError::ConnectionClosed { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }
}
