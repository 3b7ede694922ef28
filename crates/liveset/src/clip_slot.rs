//! Clip slot endpoints, addressed by (track, slot).

use std::sync::Arc;

use liveproto::{OscArg, OscClient};
use tracing::debug;

use crate::error::{LiveError, Result};
use crate::reply;

#[derive(Clone)]
pub struct ClipSlot {
    client: Arc<OscClient>,
}

impl ClipSlot {
    pub fn new(client: Arc<OscClient>) -> Self {
        Self { client }
    }

    fn target(track: i32, slot: i32) -> Result<[OscArg; 2]> {
        Ok([reply::index("track", track)?, reply::index("slot", slot)?])
    }

    async fn get_flag(&self, property: &str, track: i32, slot: i32) -> Result<bool> {
        let address = format!("/live/clip_slot/get/{}", property);
        let reply = reply::query(&self.client, &address, &Self::target(track, slot)?)
            .await?;
        reply::boolean(&address, &reply, 2)
    }

    async fn send(&self, action: &str, args: &[OscArg]) -> Result<()> {
        self.client
            .command(&format!("/live/clip_slot/{}", action), args)
            .await?;
        Ok(())
    }

    pub async fn has_clip(&self, track: i32, slot: i32) -> Result<bool> {
        self.get_flag("has_clip", track, slot).await
    }

    /// Create an empty MIDI clip `length` beats long
    pub async fn create_clip(&self, track: i32, slot: i32, length: f32) -> Result<()> {
        if length.is_nan() || length <= 0.0 {
            return Err(LiveError::invalid("length", format!("{} is not positive", length)));
        }
        debug!("Creating {} beat clip at {}/{}", length, track, slot);
        let [t, s] = Self::target(track, slot)?;
        self.send("create_clip", &[t, s, OscArg::Float(length)])
            .await
    }

    pub async fn delete_clip(&self, track: i32, slot: i32) -> Result<()> {
        debug!("Deleting clip at {}/{}", track, slot);
        self.send("delete_clip", &Self::target(track, slot)?).await
    }

    pub async fn fire(&self, track: i32, slot: i32) -> Result<()> {
        self.send("fire", &Self::target(track, slot)?).await
    }

    pub async fn get_is_playing(&self, track: i32, slot: i32) -> Result<bool> {
        self.get_flag("is_playing", track, slot).await
    }

    pub async fn get_is_triggered(&self, track: i32, slot: i32) -> Result<bool> {
        self.get_flag("is_triggered", track, slot).await
    }

    pub async fn get_is_recording(&self, track: i32, slot: i32) -> Result<bool> {
        self.get_flag("is_recording", track, slot).await
    }
}
