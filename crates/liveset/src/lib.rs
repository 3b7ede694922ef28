//! liveset - typed access to an Ableton Live set over AbletonOSC
//!
//! Thin, stateless wrappers over [`liveproto::OscClient`]. Each accessor
//! builds an address and argument list, sends it as a command or query, and
//! reads the reply into a Rust type. Nothing is cached; every getter asks
//! Live.
//!
//! ```ignore
//! let client = OscClient::open(ClientConfig::default()).await?;
//! let live = LiveSet::new(client);
//! live.song.set_tempo(124.0).await?;
//! let name = live.track.get_name(0).await?;
//! ```
//!
//! Indices are zero-based and passed as `i32`, Live's own integer width.

pub mod application;
pub mod clip;
pub mod clip_slot;
pub mod device;
pub mod error;
pub mod probe;
mod reply;
pub mod scene;
pub mod song;
pub mod track;
pub mod view;

use std::sync::Arc;
use std::time::Duration;

use liveproto::OscClient;

pub use application::Application;
pub use clip::{Clip, Note};
pub use clip_slot::ClipSlot;
pub use device::Device;
pub use error::{LiveError, Result};
pub use probe::Availability;
pub use scene::Scene;
pub use song::Song;
pub use track::{Track, TrackInfo};
pub use view::View;

/// One of each accessor over a shared client
#[derive(Clone)]
pub struct LiveSet {
    client: Arc<OscClient>,
    pub application: Application,
    pub song: Song,
    pub track: Track,
    pub clip: Clip,
    pub clip_slot: ClipSlot,
    pub device: Device,
    pub scene: Scene,
    pub view: View,
}

impl LiveSet {
    pub fn new(client: Arc<OscClient>) -> Self {
        Self {
            application: Application::new(Arc::clone(&client)),
            song: Song::new(Arc::clone(&client)),
            track: Track::new(Arc::clone(&client)),
            clip: Clip::new(Arc::clone(&client)),
            clip_slot: ClipSlot::new(Arc::clone(&client)),
            device: Device::new(Arc::clone(&client)),
            scene: Scene::new(Arc::clone(&client)),
            view: View::new(Arc::clone(&client)),
            client,
        }
    }

    pub fn client(&self) -> &Arc<OscClient> {
        &self.client
    }

    pub async fn probe(&self, timeout: Duration) -> Availability {
        Availability::probe(&self.client, timeout).await
    }

    /// Close the shared client; every accessor stops working.
    pub async fn close(&self) {
        self.client.close().await;
    }
}
