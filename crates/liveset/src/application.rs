//! Application-level endpoints: connectivity and version info.

use std::sync::Arc;
use std::time::Duration;

use liveproto::OscClient;

use crate::error::Result;
use crate::reply;

pub const TEST_ADDRESS: &str = "/live/test";

#[derive(Clone)]
pub struct Application {
    client: Arc<OscClient>,
}

impl Application {
    pub fn new(client: Arc<OscClient>) -> Self {
        Self { client }
    }

    /// Round-trip `/live/test`. Ok(true) when AbletonOSC answered in time.
    pub async fn test(&self, timeout: Duration) -> Result<bool> {
        self.client
            .query_with_timeout(TEST_ADDRESS, &[], timeout)
            .await?;
        Ok(true)
    }

    /// Live's version, e.g. "12". Empty when the reply carries no values.
    pub async fn get_version(&self) -> Result<String> {
        let reply = self
            .client
            .query("/live/application/get/version", &[])
            .await?;
        Ok(reply.first().map(|v| v.to_string()).unwrap_or_default())
    }

    /// AbletonOSC API version, 0 when the reply carries no values. Older
    /// builds report it as a float or a string.
    pub async fn get_api_version(&self) -> Result<i32> {
        const ADDRESS: &str = "/live/api/get/version";
        let reply = self.client.query(ADDRESS, &[]).await?;
        if reply.is_empty() {
            return Ok(0);
        }
        reply::lenient_int(ADDRESS, &reply, 0)
    }
}
