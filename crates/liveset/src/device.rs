//! Device endpoints, addressed by (track, device).

use std::sync::Arc;

use liveproto::{OscArg, OscClient};

use crate::error::Result;
use crate::reply;

#[derive(Clone)]
pub struct Device {
    client: Arc<OscClient>,
}

impl Device {
    pub fn new(client: Arc<OscClient>) -> Self {
        Self { client }
    }

    fn target(track: i32, device: i32) -> Result<[OscArg; 2]> {
        Ok([reply::index("track", track)?, reply::index("device", device)?])
    }

    async fn get(&self, property: &str, track: i32, device: i32) -> Result<(String, Vec<OscArg>)> {
        let address = format!("/live/device/get/{}", property);
        let reply = reply::query(&self.client, &address, &Self::target(track, device)?)
            .await?;
        Ok((address, reply))
    }

    /// Display name, as renamed by the user
    pub async fn get_name(&self, track: i32, device: i32) -> Result<String> {
        let (address, reply) = self.get("name", track, device).await?;
        reply::string(&address, &reply, 2)
    }

    /// Live's class name, e.g. "InstrumentVector" for Wavetable
    pub async fn get_class_name(&self, track: i32, device: i32) -> Result<String> {
        let (address, reply) = self.get("class_name", track, device).await?;
        reply::string(&address, &reply, 2)
    }

    pub async fn get_num_parameters(&self, track: i32, device: i32) -> Result<i32> {
        let (address, reply) = self.get("num_parameters", track, device).await?;
        reply::int(&address, &reply, 2)
    }

    pub async fn get_parameter_names(&self, track: i32, device: i32) -> Result<Vec<String>> {
        let (address, reply) = self.get("parameters/name", track, device).await?;
        reply::strings(&address, &reply, 2)
    }

    pub async fn get_parameter_values(&self, track: i32, device: i32) -> Result<Vec<f32>> {
        let (address, reply) = self.get("parameters/value", track, device).await?;
        reply::floats(&address, &reply, 2)
    }

    pub async fn get_parameter_value(&self, track: i32, device: i32, parameter: i32) -> Result<f32> {
        const ADDRESS: &str = "/live/device/get/parameter/value";
        let [t, d] = Self::target(track, device)?;
        let args = [t, d, reply::index("parameter", parameter)?];
        let reply = reply::query(&self.client, ADDRESS, &args).await?;
        reply::float(ADDRESS, &reply, 3)
    }

    /// Live clamps `value` to the parameter's own range
    pub async fn set_parameter_value(
        &self,
        track: i32,
        device: i32,
        parameter: i32,
        value: f32,
    ) -> Result<()> {
        let [t, d] = Self::target(track, device)?;
        self.client
            .command(
                "/live/device/set/parameter/value",
                &[
                    t,
                    d,
                    reply::index("parameter", parameter)?,
                    OscArg::Float(value),
                ],
            )
            .await?;
        Ok(())
    }
}
