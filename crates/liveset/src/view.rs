//! Selection in Live's session view.

use std::sync::Arc;

use liveproto::OscClient;

use crate::error::Result;
use crate::reply;

#[derive(Clone)]
pub struct View {
    client: Arc<OscClient>,
}

impl View {
    pub fn new(client: Arc<OscClient>) -> Self {
        Self { client }
    }

    async fn get_selected(&self, address: &str) -> Result<i32> {
        let reply = self.client.query(address, &[]).await?;
        reply::int(address, &reply, 0)
    }

    pub async fn get_selected_track(&self) -> Result<i32> {
        self.get_selected("/live/view/get/selected_track").await
    }

    pub async fn set_selected_track(&self, track: i32) -> Result<()> {
        self.client
            .command(
                "/live/view/set/selected_track",
                &[reply::index("track", track)?],
            )
            .await?;
        Ok(())
    }

    pub async fn get_selected_scene(&self) -> Result<i32> {
        self.get_selected("/live/view/get/selected_scene").await
    }

    pub async fn set_selected_scene(&self, scene: i32) -> Result<()> {
        self.client
            .command(
                "/live/view/set/selected_scene",
                &[reply::index("scene", scene)?],
            )
            .await?;
        Ok(())
    }
}
