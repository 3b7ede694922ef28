//! Clip endpoints, addressed by (track, clip slot), plus MIDI notes.

use std::sync::Arc;

use liveproto::{OscArg, OscClient};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LiveError, Result};
use crate::reply;

/// Values per note on the wire: pitch, start, duration, velocity, mute
const NOTE_FIELDS: usize = 5;

/// A MIDI note in a clip. Times are in beats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: u8,
    pub start_time: f32,
    pub duration: f32,
    pub velocity: u8,
    #[serde(default)]
    pub mute: bool,
}

impl Note {
    /// An unmuted note. Pitch and velocity must be 0..=127.
    pub fn new(pitch: u8, start_time: f32, duration: f32, velocity: u8) -> Result<Self> {
        let note = Self {
            pitch,
            start_time,
            duration,
            velocity,
            mute: false,
        };
        note.validate()?;
        Ok(note)
    }

    pub fn muted(mut self, mute: bool) -> Self {
        self.mute = mute;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.pitch > 127 {
            return Err(LiveError::invalid("pitch", format!("{} is above 127", self.pitch)));
        }
        if self.velocity > 127 {
            return Err(LiveError::invalid(
                "velocity",
                format!("{} is above 127", self.velocity),
            ));
        }
        Ok(())
    }

    fn push_args(&self, args: &mut Vec<OscArg>) {
        args.push(OscArg::Int(i32::from(self.pitch)));
        args.push(OscArg::Float(self.start_time));
        args.push(OscArg::Float(self.duration));
        args.push(OscArg::Int(i32::from(self.velocity)));
        args.push(OscArg::Int(i32::from(self.mute)));
    }

    fn from_args(address: &str, fields: &[OscArg]) -> Result<Self> {
        let midi = |skip: usize, name: &str| -> Result<u8> {
            let value = reply::int(address, fields, skip)?;
            u8::try_from(value)
                .ok()
                .filter(|v| *v <= 127)
                .ok_or_else(|| LiveError::UnexpectedReply {
                    address: address.to_string(),
                    detail: format!("{} {} out of MIDI range", name, value),
                })
        };

        Ok(Self {
            pitch: midi(0, "pitch")?,
            start_time: reply::float(address, fields, 1)?,
            duration: reply::float(address, fields, 2)?,
            velocity: midi(3, "velocity")?,
            mute: reply::boolean(address, fields, 4)?,
        })
    }
}

#[derive(Clone)]
pub struct Clip {
    client: Arc<OscClient>,
}

impl Clip {
    pub fn new(client: Arc<OscClient>) -> Self {
        Self { client }
    }

    fn target(track: i32, clip: i32) -> Result<[OscArg; 2]> {
        Ok([reply::index("track", track)?, reply::index("clip", clip)?])
    }

    async fn get(&self, property: &str, track: i32, clip: i32) -> Result<(String, Vec<OscArg>)> {
        let address = format!("/live/clip/get/{}", property);
        let reply = reply::query(&self.client, &address, &Self::target(track, clip)?)
            .await?;
        Ok((address, reply))
    }

    pub async fn get_name(&self, track: i32, clip: i32) -> Result<String> {
        let (address, reply) = self.get("name", track, clip).await?;
        reply::string(&address, &reply, 2)
    }

    pub async fn set_name(&self, track: i32, clip: i32, name: &str) -> Result<()> {
        let [t, c] = Self::target(track, clip)?;
        self.client
            .command("/live/clip/set/name", &[t, c, name.into()])
            .await?;
        Ok(())
    }

    /// Length in beats
    pub async fn get_length(&self, track: i32, clip: i32) -> Result<f32> {
        let (address, reply) = self.get("length", track, clip).await?;
        reply::float(&address, &reply, 2)
    }

    pub async fn get_is_playing(&self, track: i32, clip: i32) -> Result<bool> {
        let (address, reply) = self.get("is_playing", track, clip).await?;
        reply::boolean(&address, &reply, 2)
    }

    pub async fn get_color(&self, track: i32, clip: i32) -> Result<i32> {
        let (address, reply) = self.get("color", track, clip).await?;
        reply::int(&address, &reply, 2)
    }

    pub async fn get_loop_start(&self, track: i32, clip: i32) -> Result<f32> {
        let (address, reply) = self.get("loop_start", track, clip).await?;
        reply::float(&address, &reply, 2)
    }

    pub async fn get_loop_end(&self, track: i32, clip: i32) -> Result<f32> {
        let (address, reply) = self.get("loop_end", track, clip).await?;
        reply::float(&address, &reply, 2)
    }

    pub async fn fire(&self, track: i32, clip: i32) -> Result<()> {
        self.client
            .command("/live/clip/fire", &Self::target(track, clip)?)
            .await?;
        Ok(())
    }

    pub async fn stop(&self, track: i32, clip: i32) -> Result<()> {
        self.client
            .command("/live/clip/stop", &Self::target(track, clip)?)
            .await?;
        Ok(())
    }

    /// Every note in the clip
    pub async fn get_notes(&self, track: i32, clip: i32) -> Result<Vec<Note>> {
        let (address, reply) = self.get("notes", track, clip).await?;
        let fields = reply.get(2..).unwrap_or_default();

        if fields.len() % NOTE_FIELDS != 0 {
            return Err(LiveError::UnexpectedReply {
                address,
                detail: format!(
                    "{} note values is not a multiple of {}",
                    fields.len(),
                    NOTE_FIELDS
                ),
            });
        }

        fields
            .chunks(NOTE_FIELDS)
            .map(|chunk| Note::from_args(&address, chunk))
            .collect()
    }

    /// Add notes; existing notes are kept.
    pub async fn add_notes(&self, track: i32, clip: i32, notes: &[Note]) -> Result<()> {
        if notes.is_empty() {
            return Ok(());
        }

        let mut args = Vec::with_capacity(2 + notes.len() * NOTE_FIELDS);
        args.extend(Self::target(track, clip)?);
        for note in notes {
            note.validate()?;
            note.push_args(&mut args);
        }

        debug!("Adding {} notes to clip {}/{}", notes.len(), track, clip);
        self.client.command("/live/clip/add/notes", &args).await?;
        Ok(())
    }

    /// Remove every note in the clip
    pub async fn remove_notes(&self, track: i32, clip: i32) -> Result<()> {
        self.client
            .command("/live/clip/remove/notes", &Self::target(track, clip)?)
            .await?;
        Ok(())
    }

    /// Remove notes with pitch in `start_pitch..start_pitch + pitch_span`
    /// starting in `start_time..start_time + time_span` beats.
    pub async fn remove_notes_in(
        &self,
        track: i32,
        clip: i32,
        start_pitch: u8,
        pitch_span: u8,
        start_time: f32,
        time_span: f32,
    ) -> Result<()> {
        let [t, c] = Self::target(track, clip)?;
        self.client
            .command(
                "/live/clip/remove/notes",
                &[
                    t,
                    c,
                    OscArg::Int(i32::from(start_pitch)),
                    OscArg::Int(i32::from(pitch_span)),
                    OscArg::Float(start_time),
                    OscArg::Float(time_span),
                ],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_defaults_unmuted() {
        let note = Note::new(60, 0.0, 0.5, 100).unwrap();
        assert_eq!(note.pitch, 60);
        assert_eq!(note.start_time, 0.0);
        assert_eq!(note.duration, 0.5);
        assert_eq!(note.velocity, 100);
        assert!(!note.mute);
        assert!(note.muted(true).mute);
    }

    #[test]
    fn test_note_rejects_out_of_range_midi() {
        assert!(matches!(
            Note::new(128, 0.0, 1.0, 100),
            Err(LiveError::InvalidArgument { name: "pitch", .. })
        ));
        assert!(matches!(
            Note::new(60, 0.0, 1.0, 200),
            Err(LiveError::InvalidArgument { name: "velocity", .. })
        ));
    }

    #[test]
    fn test_note_wire_layout() {
        let mut args = Vec::new();
        Note::new(64, 1.5, 0.25, 90).unwrap().muted(true).push_args(&mut args);
        assert_eq!(
            args,
            vec![
                OscArg::Int(64),
                OscArg::Float(1.5),
                OscArg::Float(0.25),
                OscArg::Int(90),
                OscArg::Int(1),
            ]
        );

        let parsed = Note::from_args("/live/clip/get/notes", &args).unwrap();
        assert_eq!(parsed, Note::new(64, 1.5, 0.25, 90).unwrap().muted(true));
    }

    #[test]
    fn test_note_from_reply_rejects_bad_pitch() {
        let args = vec![
            OscArg::Int(300),
            OscArg::Float(0.0),
            OscArg::Float(1.0),
            OscArg::Int(100),
            OscArg::Int(0),
        ];
        assert!(matches!(
            Note::from_args("/live/clip/get/notes", &args),
            Err(LiveError::UnexpectedReply { .. })
        ));
    }
}
