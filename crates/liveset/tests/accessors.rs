//! Accessor tests against a scripted fake Live
//!
//! Verifies the addresses and arguments each accessor puts on the wire and
//! how replies (with their echoed indices) are read back.

mod common;

use std::collections::HashMap;
use std::time::Duration;

use common::FakeLive;
use liveproto::{OscArg, OscMessage};
use liveset::{Availability, LiveError, Note};
use pretty_assertions::assert_eq;

fn values(entries: &[(&'static str, Vec<OscArg>)]) -> HashMap<&'static str, Vec<OscArg>> {
    entries.iter().cloned().collect()
}

#[tokio::test]
async fn test_application_version_and_liveness() {
    let fake = FakeLive::spawn(values(&[
        ("/live/test", vec!["ok".into()]),
        ("/live/application/get/version", vec![12.into(), 1.into()]),
        ("/live/api/get/version", vec![3.into()]),
    ]))
    .await;
    let live = fake.connect().await;

    assert!(live.application.test(Duration::from_secs(1)).await.unwrap());
    assert_eq!(live.application.get_version().await.unwrap(), "12");
    assert_eq!(live.application.get_api_version().await.unwrap(), 3);

    live.close().await;
}

#[tokio::test]
async fn test_application_empty_replies_use_defaults() {
    let fake = FakeLive::spawn(values(&[
        ("/live/application/get/version", vec![]),
        ("/live/api/get/version", vec![]),
    ]))
    .await;
    let live = fake.connect().await;

    assert_eq!(live.application.get_version().await.unwrap(), "");
    assert_eq!(live.application.get_api_version().await.unwrap(), 0);

    live.close().await;
}

#[tokio::test]
async fn test_song_getters_and_transport() {
    let fake = FakeLive::spawn(values(&[
        ("/live/song/get/num_tracks", vec![4.into()]),
        ("/live/song/get/num_scenes", vec![8.into()]),
        ("/live/song/get/tempo", vec![OscArg::Float(120.0)]),
    ]))
    .await;
    let live = fake.connect().await;

    assert_eq!(live.song.get_num_tracks().await.unwrap(), 4);
    assert_eq!(live.song.get_num_scenes().await.unwrap(), 8);
    assert_eq!(live.song.get_tempo().await.unwrap(), 120.0);

    live.song.set_tempo(96.5).await.unwrap();
    live.song.create_midi_track(liveset::song::APPEND).await.unwrap();
    live.song.start_playing().await.unwrap();

    let received = fake.wait_for(6).await;
    assert_eq!(
        received[3..].to_vec(),
        vec![
            OscMessage::new("/live/song/set/tempo", vec![OscArg::Float(96.5)]),
            OscMessage::new("/live/song/create_midi_track", vec![OscArg::Int(-1)]),
            OscMessage::new("/live/song/start_playing", vec![]),
        ]
    );

    live.close().await;
}

#[tokio::test]
async fn test_song_rejects_bad_arguments_without_sending() {
    let fake = FakeLive::spawn(HashMap::new()).await;
    let live = fake.connect().await;

    assert!(matches!(
        live.song.set_tempo(5.0).await,
        Err(LiveError::InvalidArgument { name: "tempo", .. })
    ));
    assert!(matches!(
        live.song.create_audio_track(-2).await,
        Err(LiveError::InvalidArgument { .. })
    ));
    assert!(matches!(
        live.song.delete_track(-1).await,
        Err(LiveError::InvalidArgument { name: "track", .. })
    ));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(fake.received().is_empty());

    live.close().await;
}

#[tokio::test]
async fn test_track_getters_skip_echoed_index() {
    let fake = FakeLive::spawn(values(&[
        ("/live/track/get/name", vec!["Drums".into()]),
        ("/live/track/get/volume", vec![OscArg::Float(0.85)]),
        ("/live/track/get/panning", vec![OscArg::Float(-0.25)]),
        ("/live/track/get/mute", vec![1.into()]),
        ("/live/track/get/solo", vec![0.into()]),
        ("/live/track/get/arm", vec![OscArg::Bool(true)]),
        ("/live/track/get/color", vec![0xFF0000.into()]),
        ("/live/track/get/num_devices", vec![2.into()]),
        ("/live/track/get/devices/name", vec!["Operator".into(), "Reverb".into()]),
        ("/live/track/get/send", vec![OscArg::Float(0.5)]),
    ]))
    .await;
    let live = fake.connect().await;

    assert_eq!(live.track.get_name(2).await.unwrap(), "Drums");
    assert_eq!(live.track.get_volume(2).await.unwrap(), 0.85);
    assert_eq!(live.track.get_panning(2).await.unwrap(), -0.25);
    assert!(live.track.get_mute(2).await.unwrap());
    assert!(!live.track.get_solo(2).await.unwrap());
    assert!(live.track.get_arm(2).await.unwrap());
    assert_eq!(live.track.get_color(2).await.unwrap(), 0xFF0000);
    assert_eq!(live.track.get_num_devices(2).await.unwrap(), 2);
    assert_eq!(
        live.track.get_device_names(2).await.unwrap(),
        vec!["Operator".to_string(), "Reverb".to_string()]
    );
    assert_eq!(live.track.get_send(2, 0).await.unwrap(), 0.5);

    let requests = fake.received();
    assert_eq!(requests[0], OscMessage::new("/live/track/get/name", vec![2.into()]));
    assert_eq!(
        requests[9],
        OscMessage::new("/live/track/get/send", vec![2.into(), 0.into()])
    );

    live.close().await;
}

#[tokio::test]
async fn test_track_setters_send_expected_messages() {
    let fake = FakeLive::spawn(HashMap::new()).await;
    let live = fake.connect().await;

    live.track.set_name(0, "Bass").await.unwrap();
    live.track.set_volume(0, 0.5).await.unwrap();
    live.track.set_panning(0, -1.0).await.unwrap();
    live.track.set_mute(0, true).await.unwrap();
    live.track.set_solo(0, false).await.unwrap();
    live.track.set_send(0, 1, 0.25).await.unwrap();
    live.track.stop_all_clips(0).await.unwrap();
    live.track.delete_device(0, 3).await.unwrap();

    let received = fake.wait_for(8).await;
    assert_eq!(
        received,
        vec![
            OscMessage::new("/live/track/set/name", vec![0.into(), "Bass".into()]),
            OscMessage::new("/live/track/set/volume", vec![0.into(), OscArg::Float(0.5)]),
            OscMessage::new("/live/track/set/panning", vec![0.into(), OscArg::Float(-1.0)]),
            OscMessage::new("/live/track/set/mute", vec![0.into(), 1.into()]),
            OscMessage::new("/live/track/set/solo", vec![0.into(), 0.into()]),
            OscMessage::new(
                "/live/track/set/send",
                vec![0.into(), 1.into(), OscArg::Float(0.25)]
            ),
            OscMessage::new("/live/track/stop_all_clips", vec![0.into()]),
            OscMessage::new("/live/track/delete_device", vec![0.into(), 3.into()]),
        ]
    );

    live.close().await;
}

#[tokio::test]
async fn test_track_range_validation() {
    let fake = FakeLive::spawn(HashMap::new()).await;
    let live = fake.connect().await;

    assert!(matches!(
        live.track.set_volume(0, 1.5).await,
        Err(LiveError::InvalidArgument { name: "volume", .. })
    ));
    assert!(matches!(
        live.track.set_panning(0, -1.01).await,
        Err(LiveError::InvalidArgument { name: "panning", .. })
    ));
    assert!(matches!(
        live.track.set_send(0, 0, -0.1).await,
        Err(LiveError::InvalidArgument { .. })
    ));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(fake.received().is_empty());

    live.close().await;
}

#[tokio::test]
async fn test_insert_device_reports_index_or_not_found() {
    let fake = FakeLive::spawn_with(|request| {
        if request.address != "/live/track/insert_device" {
            return None;
        }
        let index = match request.args[1].as_str() {
            Some("Wavetable") => 0,
            _ => -1,
        };
        Some(vec![request.args[0].clone(), OscArg::Int(index)])
    })
    .await;
    let live = fake.connect().await;

    assert_eq!(live.track.insert_device(1, "Wavetable").await.unwrap(), 0);
    assert_eq!(
        live.track.insert_device(1, "NonexistentDevice12345").await.unwrap(),
        liveset::track::DEVICE_NOT_FOUND
    );

    live.close().await;
}

#[tokio::test]
async fn test_track_snapshot_reads_everything() {
    let fake = FakeLive::spawn(values(&[
        ("/live/track/get/name", vec!["Keys".into()]),
        ("/live/track/get/volume", vec![OscArg::Float(0.7)]),
        ("/live/track/get/panning", vec![OscArg::Float(0.0)]),
        ("/live/track/get/mute", vec![0.into()]),
        ("/live/track/get/solo", vec![1.into()]),
        ("/live/track/get/arm", vec![0.into()]),
        ("/live/track/get/color", vec![42.into()]),
        ("/live/track/get/devices/name", vec!["Wavetable".into()]),
    ]))
    .await;
    let live = fake.connect().await;

    let info = live.track.snapshot(1).await.unwrap();
    assert_eq!(
        info,
        liveset::TrackInfo {
            index: 1,
            name: "Keys".to_string(),
            volume: 0.7,
            panning: 0.0,
            mute: false,
            solo: true,
            arm: false,
            color: 42,
            devices: vec!["Wavetable".to_string()],
        }
    );

    live.close().await;
}

#[tokio::test]
async fn test_clip_getters_and_notes() {
    let fake = FakeLive::spawn(values(&[
        ("/live/clip/get/name", vec!["Intro".into()]),
        ("/live/clip/get/length", vec![OscArg::Float(16.0)]),
        ("/live/clip/get/is_playing", vec![0.into()]),
        ("/live/clip/get/loop_start", vec![OscArg::Float(0.0)]),
        ("/live/clip/get/loop_end", vec![OscArg::Float(4.0)]),
        (
            "/live/clip/get/notes",
            vec![
                60.into(),
                OscArg::Float(0.0),
                OscArg::Float(0.5),
                100.into(),
                0.into(),
                64.into(),
                OscArg::Float(1.0),
                OscArg::Float(0.25),
                80.into(),
                OscArg::Bool(true),
            ],
        ),
    ]))
    .await;
    let live = fake.connect().await;

    assert_eq!(live.clip.get_name(0, 0).await.unwrap(), "Intro");
    assert_eq!(live.clip.get_length(0, 0).await.unwrap(), 16.0);
    assert!(!live.clip.get_is_playing(0, 0).await.unwrap());
    assert_eq!(live.clip.get_loop_start(0, 0).await.unwrap(), 0.0);
    assert_eq!(live.clip.get_loop_end(0, 0).await.unwrap(), 4.0);

    let notes = live.clip.get_notes(0, 0).await.unwrap();
    assert_eq!(
        notes,
        vec![
            Note::new(60, 0.0, 0.5, 100).unwrap(),
            Note::new(64, 1.0, 0.25, 80).unwrap().muted(true),
        ]
    );

    live.close().await;
}

#[tokio::test]
async fn test_clip_notes_with_ragged_reply_are_rejected() {
    let fake = FakeLive::spawn(values(&[(
        "/live/clip/get/notes",
        vec![60.into(), OscArg::Float(0.0), OscArg::Float(0.5)],
    )]))
    .await;
    let live = fake.connect().await;

    let err = live.clip.get_notes(0, 0).await.unwrap_err();
    assert!(matches!(err, LiveError::UnexpectedReply { .. }), "{}", err);

    live.close().await;
}

#[tokio::test]
async fn test_clip_add_and_remove_notes() {
    let fake = FakeLive::spawn(HashMap::new()).await;
    let live = fake.connect().await;

    let notes = [
        Note::new(36, 0.0, 0.25, 127).unwrap(),
        Note::new(38, 1.0, 0.25, 110).unwrap(),
    ];
    live.clip.add_notes(1, 2, &notes).await.unwrap();
    live.clip.add_notes(1, 2, &[]).await.unwrap();
    live.clip.remove_notes(1, 2).await.unwrap();

    let received = fake.wait_for(2).await;
    assert_eq!(
        received,
        vec![
            OscMessage::new(
                "/live/clip/add/notes",
                vec![
                    1.into(),
                    2.into(),
                    36.into(),
                    OscArg::Float(0.0),
                    OscArg::Float(0.25),
                    127.into(),
                    0.into(),
                    38.into(),
                    OscArg::Float(1.0),
                    OscArg::Float(0.25),
                    110.into(),
                    0.into(),
                ]
            ),
            OscMessage::new("/live/clip/remove/notes", vec![1.into(), 2.into()]),
        ]
    );

    live.close().await;
}

#[tokio::test]
async fn test_clip_slot_lifecycle_messages() {
    let fake = FakeLive::spawn(values(&[
        ("/live/clip_slot/get/has_clip", vec![1.into()]),
        ("/live/clip_slot/get/is_triggered", vec![0.into()]),
    ]))
    .await;
    let live = fake.connect().await;

    live.clip_slot.create_clip(0, 3, 4.0).await.unwrap();
    assert!(live.clip_slot.has_clip(0, 3).await.unwrap());
    assert!(!live.clip_slot.get_is_triggered(0, 3).await.unwrap());
    live.clip_slot.delete_clip(0, 3).await.unwrap();

    assert!(matches!(
        live.clip_slot.create_clip(0, 3, 0.0).await,
        Err(LiveError::InvalidArgument { name: "length", .. })
    ));

    let received = fake.wait_for(4).await;
    assert_eq!(
        received[0],
        OscMessage::new(
            "/live/clip_slot/create_clip",
            vec![0.into(), 3.into(), OscArg::Float(4.0)]
        )
    );
    assert_eq!(
        received[3],
        OscMessage::new("/live/clip_slot/delete_clip", vec![0.into(), 3.into()])
    );

    live.close().await;
}

#[tokio::test]
async fn test_device_parameters() {
    let fake = FakeLive::spawn(values(&[
        ("/live/device/get/name", vec!["My Synth".into()]),
        ("/live/device/get/class_name", vec!["InstrumentVector".into()]),
        ("/live/device/get/num_parameters", vec![3.into()]),
        (
            "/live/device/get/parameters/name",
            vec!["Device On".into(), "Osc 1 Pos".into(), "Filter Freq".into()],
        ),
        ("/live/device/get/parameter/value", vec![OscArg::Float(0.75)]),
    ]))
    .await;
    let live = fake.connect().await;

    assert_eq!(live.device.get_name(1, 0).await.unwrap(), "My Synth");
    assert_eq!(live.device.get_class_name(1, 0).await.unwrap(), "InstrumentVector");
    assert_eq!(live.device.get_num_parameters(1, 0).await.unwrap(), 3);
    assert_eq!(
        live.device.get_parameter_names(1, 0).await.unwrap(),
        vec!["Device On", "Osc 1 Pos", "Filter Freq"]
    );
    assert_eq!(live.device.get_parameter_value(1, 0, 2).await.unwrap(), 0.75);

    live.device.set_parameter_value(1, 0, 2, 0.1).await.unwrap();
    let received = fake.wait_for(6).await;
    assert_eq!(
        received[5],
        OscMessage::new(
            "/live/device/set/parameter/value",
            vec![1.into(), 0.into(), 2.into(), OscArg::Float(0.1)]
        )
    );

    live.close().await;
}

#[tokio::test]
async fn test_scene_and_view() {
    let fake = FakeLive::spawn(values(&[
        ("/live/scene/get/name", vec!["Verse".into()]),
        ("/live/scene/get/color", vec![7.into()]),
        ("/live/view/get/selected_track", vec![2.into()]),
        ("/live/view/get/selected_scene", vec![0.into()]),
    ]))
    .await;
    let live = fake.connect().await;

    assert_eq!(live.scene.get_name(1).await.unwrap(), "Verse");
    assert_eq!(live.scene.get_color(1).await.unwrap(), 7);
    assert_eq!(live.view.get_selected_track().await.unwrap(), 2);
    assert_eq!(live.view.get_selected_scene().await.unwrap(), 0);

    live.scene.fire(1).await.unwrap();
    live.view.set_selected_track(3).await.unwrap();

    let received = fake.wait_for(6).await;
    assert_eq!(received[4], OscMessage::new("/live/scene/fire", vec![1.into()]));
    assert_eq!(
        received[5],
        OscMessage::new("/live/view/set/selected_track", vec![3.into()])
    );

    live.close().await;
}

#[tokio::test]
async fn test_wrong_reply_type_is_unexpected_reply() {
    let fake = FakeLive::spawn(values(&[("/live/song/get/tempo", vec!["fast".into()])])).await;
    let live = fake.connect().await;

    match live.song.get_tempo().await {
        Err(LiveError::UnexpectedReply { address, .. }) => {
            assert_eq!(address, "/live/song/get/tempo")
        }
        other => panic!("expected UnexpectedReply, got {:?}", other),
    }

    live.close().await;
}

#[tokio::test]
async fn test_silent_peer_surfaces_timeout() {
    let fake = FakeLive::spawn(HashMap::new()).await;
    let live = fake.connect().await;

    let err = live.track.get_name(0).await.unwrap_err();
    assert!(err.is_timeout(), "{}", err);

    live.close().await;
}

#[tokio::test]
async fn test_probe_reports_availability() {
    let fake = FakeLive::spawn(values(&[("/live/test", vec!["ok".into()])])).await;
    let live = fake.connect().await;

    match live.probe(Duration::from_secs(1)).await {
        Availability::Available { latency } => assert!(latency < Duration::from_secs(1)),
        other => panic!("expected Available, got {}", other),
    }
    live.close().await;

    let silent = FakeLive::spawn(HashMap::new()).await;
    let live = silent.connect().await;
    let availability = live.probe(Duration::from_millis(100)).await;
    assert!(!availability.is_available());
    assert!(availability.to_string().starts_with("unavailable"));
    live.close().await;
}

#[tokio::test]
async fn test_accessors_fail_after_close() {
    let fake = FakeLive::spawn(values(&[("/live/song/get/tempo", vec![OscArg::Float(120.0)])])).await;
    let live = fake.connect().await;
    live.close().await;

    match live.song.get_tempo().await {
        Err(LiveError::Client(e)) => assert!(e.is_closed()),
        other => panic!("expected closed client error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_api_version_accepts_float_and_string_replies() {
    let fake = FakeLive::spawn_with(|request| match request.address.as_str() {
        "/live/api/get/version" => Some(vec![OscArg::Float(3.0)]),
        "/live/application/get/version" => Some(vec!["12".into()]),
        _ => None,
    })
    .await;
    let live = fake.connect().await;
    assert_eq!(live.application.get_api_version().await.unwrap(), 3);
    live.close().await;

    let fake = FakeLive::spawn(values(&[("/live/api/get/version", vec!["4".into()])])).await;
    let live = fake.connect().await;
    assert_eq!(live.application.get_api_version().await.unwrap(), 4);
    live.close().await;
}

#[tokio::test]
async fn test_reply_for_another_object_is_rejected() {
    // Always answers as if track 1 had been asked for
    let fake = FakeLive::spawn_with(|request| {
        (request.address == "/live/track/get/name").then(|| vec![1.into(), "Bass".into()])
    })
    .await;
    let live = fake.connect().await;

    assert_eq!(live.track.get_name(1).await.unwrap(), "Bass");
    match live.track.get_name(0).await {
        Err(LiveError::UnexpectedReply { address, .. }) => {
            assert_eq!(address, "/live/track/get/name")
        }
        other => panic!("expected UnexpectedReply, got {:?}", other),
    }

    live.close().await;
}
