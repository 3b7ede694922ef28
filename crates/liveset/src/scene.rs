//! Scene endpoints.

use std::sync::Arc;

use liveproto::OscClient;

use crate::error::Result;
use crate::reply;

#[derive(Clone)]
pub struct Scene {
    client: Arc<OscClient>,
}

impl Scene {
    pub fn new(client: Arc<OscClient>) -> Self {
        Self { client }
    }

    /// Launch every clip in the scene
    pub async fn fire(&self, scene: i32) -> Result<()> {
        self.client
            .command("/live/scene/fire", &[reply::index("scene", scene)?])
            .await?;
        Ok(())
    }

    pub async fn get_name(&self, scene: i32) -> Result<String> {
        const ADDRESS: &str = "/live/scene/get/name";
        let reply = reply::query(&self.client, ADDRESS, &[reply::index("scene", scene)?])
            .await?;
        reply::string(ADDRESS, &reply, 1)
    }

    pub async fn set_name(&self, scene: i32, name: &str) -> Result<()> {
        self.client
            .command(
                "/live/scene/set/name",
                &[reply::index("scene", scene)?, name.into()],
            )
            .await?;
        Ok(())
    }

    pub async fn get_color(&self, scene: i32) -> Result<i32> {
        const ADDRESS: &str = "/live/scene/get/color";
        let reply = reply::query(&self.client, ADDRESS, &[reply::index("scene", scene)?])
            .await?;
        reply::int(ADDRESS, &reply, 1)
    }
}
