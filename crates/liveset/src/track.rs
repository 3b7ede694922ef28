//! Track endpoints: mixer state, devices and sends.
//!
//! Replies echo the track index (and send index, where there is one) before
//! the value.

use std::sync::Arc;

use liveproto::{OscArg, OscClient};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::reply;

pub const VOLUME_RANGE: std::ops::RangeInclusive<f32> = 0.0..=1.0;
pub const PANNING_RANGE: std::ops::RangeInclusive<f32> = -1.0..=1.0;

/// Returned by [`Track::insert_device`] when Live has no device by that name
pub const DEVICE_NOT_FOUND: i32 = -1;

/// One track's mixer state, read in a single pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackInfo {
    pub index: i32,
    pub name: String,
    pub volume: f32,
    pub panning: f32,
    pub mute: bool,
    pub solo: bool,
    pub arm: bool,
    pub color: i32,
    pub devices: Vec<String>,
}

#[derive(Clone)]
pub struct Track {
    client: Arc<OscClient>,
}

impl Track {
    pub fn new(client: Arc<OscClient>) -> Self {
        Self { client }
    }

    async fn get(&self, property: &str, track: i32) -> Result<(String, Vec<OscArg>)> {
        let address = format!("/live/track/get/{}", property);
        let reply = reply::query(&self.client, &address, &[reply::index("track", track)?])
            .await?;
        Ok((address, reply))
    }

    async fn set(&self, property: &str, track: i32, value: OscArg) -> Result<()> {
        let address = format!("/live/track/set/{}", property);
        self.client
            .command(&address, &[reply::index("track", track)?, value])
            .await?;
        Ok(())
    }

    pub async fn get_name(&self, track: i32) -> Result<String> {
        let (address, reply) = self.get("name", track).await?;
        reply::string(&address, &reply, 1)
    }

    pub async fn set_name(&self, track: i32, name: &str) -> Result<()> {
        self.set("name", track, name.into()).await
    }

    /// Fader position, 0.0 to 1.0 (0.85 is 0 dB)
    pub async fn get_volume(&self, track: i32) -> Result<f32> {
        let (address, reply) = self.get("volume", track).await?;
        reply::float(&address, &reply, 1)
    }

    pub async fn set_volume(&self, track: i32, volume: f32) -> Result<()> {
        reply::check_range("volume", volume, VOLUME_RANGE)?;
        self.set("volume", track, OscArg::Float(volume)).await
    }

    pub async fn get_panning(&self, track: i32) -> Result<f32> {
        let (address, reply) = self.get("panning", track).await?;
        reply::float(&address, &reply, 1)
    }

    /// -1.0 is hard left, 1.0 hard right
    pub async fn set_panning(&self, track: i32, panning: f32) -> Result<()> {
        reply::check_range("panning", panning, PANNING_RANGE)?;
        self.set("panning", track, OscArg::Float(panning)).await
    }

    pub async fn get_mute(&self, track: i32) -> Result<bool> {
        let (address, reply) = self.get("mute", track).await?;
        reply::boolean(&address, &reply, 1)
    }

    pub async fn set_mute(&self, track: i32, mute: bool) -> Result<()> {
        self.set("mute", track, OscArg::Int(i32::from(mute))).await
    }

    pub async fn get_solo(&self, track: i32) -> Result<bool> {
        let (address, reply) = self.get("solo", track).await?;
        reply::boolean(&address, &reply, 1)
    }

    pub async fn set_solo(&self, track: i32, solo: bool) -> Result<()> {
        self.set("solo", track, OscArg::Int(i32::from(solo))).await
    }

    pub async fn get_arm(&self, track: i32) -> Result<bool> {
        let (address, reply) = self.get("arm", track).await?;
        reply::boolean(&address, &reply, 1)
    }

    /// Color as 0xRRGGBB
    pub async fn get_color(&self, track: i32) -> Result<i32> {
        let (address, reply) = self.get("color", track).await?;
        reply::int(&address, &reply, 1)
    }

    pub async fn get_num_devices(&self, track: i32) -> Result<i32> {
        let (address, reply) = self.get("num_devices", track).await?;
        reply::int(&address, &reply, 1)
    }

    /// Device names in chain order
    pub async fn get_device_names(&self, track: i32) -> Result<Vec<String>> {
        let (address, reply) = self.get("devices/name", track).await?;
        reply::strings(&address, &reply, 1)
    }

    /// Level of send `send` (0 is the first return track)
    pub async fn get_send(&self, track: i32, send: i32) -> Result<f32> {
        const ADDRESS: &str = "/live/track/get/send";
        let reply = reply::query(
            &self.client,
            ADDRESS,
            &[reply::index("track", track)?, reply::index("send", send)?],
        )
        .await?;
        reply::float(ADDRESS, &reply, 2)
    }

    pub async fn set_send(&self, track: i32, send: i32, level: f32) -> Result<()> {
        reply::check_range("send level", level, VOLUME_RANGE)?;
        self.client
            .command(
                "/live/track/set/send",
                &[
                    reply::index("track", track)?,
                    reply::index("send", send)?,
                    OscArg::Float(level),
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn stop_all_clips(&self, track: i32) -> Result<()> {
        self.client
            .command("/live/track/stop_all_clips", &[reply::index("track", track)?])
            .await?;
        Ok(())
    }

    /// Load a device from Live's browser by name onto the end of the chain.
    ///
    /// Returns the new device's index, or [`DEVICE_NOT_FOUND`].
    pub async fn insert_device(&self, track: i32, name: &str) -> Result<i32> {
        const ADDRESS: &str = "/live/track/insert_device";
        debug!("Inserting {} on track {}", name, track);
        let reply = self
            .client
            .query(ADDRESS, &[reply::index("track", track)?, name.into()])
            .await?;
        // The device index is the last value, after any echoed track index
        reply::int(ADDRESS, &reply, reply.len().saturating_sub(1))
    }

    pub async fn delete_device(&self, track: i32, device: i32) -> Result<()> {
        debug!("Deleting device {} on track {}", device, track);
        self.client
            .command(
                "/live/track/delete_device",
                &[reply::index("track", track)?, reply::index("device", device)?],
            )
            .await?;
        Ok(())
    }

    /// Read a track's mixer state and device list concurrently.
    ///
    /// Each property has its own address, so the queries don't contend.
    pub async fn snapshot(&self, track: i32) -> Result<TrackInfo> {
        let (name, volume, panning, mute, solo, arm, color, devices) = tokio::try_join!(
            self.get_name(track),
            self.get_volume(track),
            self.get_panning(track),
            self.get_mute(track),
            self.get_solo(track),
            self.get_arm(track),
            self.get_color(track),
            self.get_device_names(track),
        )?;

        Ok(TrackInfo {
            index: track,
            name,
            volume,
            panning,
            mute,
            solo,
            arm,
            color,
            devices,
        })
    }
}
