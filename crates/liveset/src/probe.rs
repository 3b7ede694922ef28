//! Is there a Live on the other end?
//!
//! Tests and tools that need a running Live probe once and pass the result
//! around. Nothing here caches the answer.

use std::fmt;
use std::time::{Duration, Instant};

use liveproto::OscClient;
use tracing::{debug, info};

use crate::application::TEST_ADDRESS;

#[derive(Debug, Clone, PartialEq)]
pub enum Availability {
    Available { latency: Duration },
    Unavailable { reason: String },
}

impl Availability {
    /// Send `/live/test` once and wait up to `timeout` for the echo.
    pub async fn probe(client: &OscClient, timeout: Duration) -> Self {
        let start = Instant::now();
        match client.query_with_timeout(TEST_ADDRESS, &[], timeout).await {
            Ok(_) => {
                let latency = start.elapsed();
                info!("{}: Live answered in {:?}", client.name(), latency);
                Availability::Available { latency }
            }
            Err(e) => {
                debug!("{}: Live unavailable: {}", client.name(), e);
                Availability::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available { .. })
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available { latency } => write!(f, "available ({:?})", latency),
            Availability::Unavailable { reason } => write!(f, "unavailable: {}", reason),
        }
    }
}
