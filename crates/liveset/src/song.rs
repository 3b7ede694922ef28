//! Song-level endpoints: transport, tempo, and track/scene creation.

use std::sync::Arc;

use liveproto::{OscArg, OscClient};
use tracing::debug;

use crate::error::{LiveError, Result};
use crate::reply;

/// Live's tempo range in BPM
pub const TEMPO_RANGE: std::ops::RangeInclusive<f32> = 20.0..=999.0;

/// Pass as the index to create a track or scene after all others
pub const APPEND: i32 = -1;

#[derive(Clone)]
pub struct Song {
    client: Arc<OscClient>,
}

impl Song {
    pub fn new(client: Arc<OscClient>) -> Self {
        Self { client }
    }

    async fn get_int(&self, address: &str) -> Result<i32> {
        let reply = self.client.query(address, &[]).await?;
        reply::int(address, &reply, 0)
    }

    pub async fn get_num_tracks(&self) -> Result<i32> {
        self.get_int("/live/song/get/num_tracks").await
    }

    pub async fn get_num_scenes(&self) -> Result<i32> {
        self.get_int("/live/song/get/num_scenes").await
    }

    /// Insert a MIDI track at `index`, or at the end with [`APPEND`].
    pub async fn create_midi_track(&self, index: i32) -> Result<()> {
        debug!("Creating MIDI track at {}", index);
        self.client
            .command("/live/song/create_midi_track", &[insert_position(index)?])
            .await?;
        Ok(())
    }

    /// Insert an audio track at `index`, or at the end with [`APPEND`].
    pub async fn create_audio_track(&self, index: i32) -> Result<()> {
        debug!("Creating audio track at {}", index);
        self.client
            .command("/live/song/create_audio_track", &[insert_position(index)?])
            .await?;
        Ok(())
    }

    pub async fn create_return_track(&self) -> Result<()> {
        self.client
            .command("/live/song/create_return_track", &[])
            .await?;
        Ok(())
    }

    pub async fn delete_track(&self, index: i32) -> Result<()> {
        debug!("Deleting track {}", index);
        self.client
            .command("/live/song/delete_track", &[reply::index("track", index)?])
            .await?;
        Ok(())
    }

    pub async fn delete_return_track(&self, index: i32) -> Result<()> {
        self.client
            .command(
                "/live/song/delete_return_track",
                &[reply::index("return track", index)?],
            )
            .await?;
        Ok(())
    }

    /// Insert a scene at `index`, or at the end with [`APPEND`].
    pub async fn create_scene(&self, index: i32) -> Result<()> {
        self.client
            .command("/live/song/create_scene", &[insert_position(index)?])
            .await?;
        Ok(())
    }

    pub async fn delete_scene(&self, index: i32) -> Result<()> {
        self.client
            .command("/live/song/delete_scene", &[reply::index("scene", index)?])
            .await?;
        Ok(())
    }

    pub async fn start_playing(&self) -> Result<()> {
        self.client.command("/live/song/start_playing", &[]).await?;
        Ok(())
    }

    pub async fn stop_playing(&self) -> Result<()> {
        self.client.command("/live/song/stop_playing", &[]).await?;
        Ok(())
    }

    pub async fn get_tempo(&self) -> Result<f32> {
        const ADDRESS: &str = "/live/song/get/tempo";
        let reply = self.client.query(ADDRESS, &[]).await?;
        reply::float(ADDRESS, &reply, 0)
    }

    pub async fn set_tempo(&self, bpm: f32) -> Result<()> {
        reply::check_range("tempo", bpm, TEMPO_RANGE)?;
        debug!("Setting tempo to {}", bpm);
        self.client
            .command("/live/song/set/tempo", &[OscArg::Float(bpm)])
            .await?;
        Ok(())
    }
}

fn insert_position(index: i32) -> Result<OscArg> {
    if index < APPEND {
        return Err(LiveError::invalid(
            "index",
            format!("{} is neither a position nor -1", index),
        ));
    }
    Ok(OscArg::Int(index))
}
