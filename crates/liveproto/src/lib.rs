//! liveproto - OSC transport for driving Ableton Live through AbletonOSC
//!
//! AbletonOSC runs inside Live and speaks OSC over UDP. Every control
//! surface operation is one of two shapes:
//!
//! - **Command**: a one-way message (`/live/song/start_playing`). Sent and
//!   forgotten; no reply is expected.
//! - **Query**: a message whose reply comes back on the same address
//!   (`/live/song/get/tempo` → `/live/song/get/tempo 120.0`). The caller
//!   waits, bounded by a timeout.
//!
//! ## Layers
//!
//! - [`packet`]: OSC 1.0 codec (messages and bundles). Always available.
//! - [`correlator`]: address → waiter registry, one waiter per address.
//! - [`client`]: the UDP socket, the listener task, and [`OscClient`].
//!
//! The async client lives behind the default `peer` feature, so the codec
//! can be used without pulling in tokio.
//!
//! ## Correlation
//!
//! OSC carries no request id, so replies are matched by address. At most one
//! query per address may be in flight; a second one fails fast with
//! [`ClientError::Busy`] rather than stealing the first caller's reply.
//! Replies that arrive after their query timed out are dropped.

pub mod packet;

#[cfg(feature = "peer")]
pub mod client;
#[cfg(feature = "peer")]
pub mod correlator;
#[cfg(feature = "peer")]
pub mod error;

pub use packet::{decode, encode_bundle, OscArg, OscMessage, PacketError};

#[cfg(feature = "peer")]
pub use client::{ClientConfig, OscClient, ERROR_ADDRESS, MIN_DATAGRAM};
#[cfg(feature = "peer")]
pub use correlator::{Correlator, Waiter};
#[cfg(feature = "peer")]
pub use error::ClientError;
