//! Integration tests for the playback engine.
//!
//! Drives a full engine — clip model, clock, mode, preloader — through
//! scripted media-element events and checks the published clock at every
//! step.

use reelsync_core::{EngineConfig, Seconds};
use reelsync_playback::media::testing::ScriptedElement;
use reelsync_playback::preload::ElementFactory;
use reelsync_playback::{
    ElementRole, MediaEvent, PlaybackEngine, Preloader, SyncState,
};
use reelsync_timeline::{Clip, ClipModel, ClipPatch, MediaSource, TimelineFile};
use std::cell::RefCell;
use std::rc::Rc;

// ── Helpers ────────────────────────────────────────────────────

fn clip(uri: &str, secs: f64) -> Clip {
    let mut c = Clip::new(MediaSource::new(uri));
    c.set_original_duration(Seconds::new(secs));
    c
}

fn build_model() -> ClipModel {
    let mut model = ClipModel::new();
    model.add_clip(clip("media/intro.mp4", 5.0));
    model.add_clip(clip("media/body.mp4", 3.0));
    model.add_clip(clip("media/outro.mp4", 7.0));
    model
}

fn video_master(model: ClipModel) -> (PlaybackEngine, ScriptedElement) {
    let first_source = model
        .clips()
        .first()
        .map(|c| c.source.clone())
        .unwrap_or_else(|| MediaSource::new("media/intro.mp4"));
    let video = ScriptedElement::with_source(first_source, Seconds::new(5.0));
    let engine = PlaybackEngine::video_master(
        model,
        Box::new(video.clone()),
        Preloader::disabled(),
        EngineConfig::default(),
    );
    (engine, video)
}

fn drive(engine: &mut PlaybackEngine, t: f64) {
    engine.handle_event(ElementRole::Driver, MediaEvent::TimeUpdate(Seconds::new(t)));
}

// ── Full timeline walk ─────────────────────────────────────────

#[test]
fn video_master_walks_the_whole_timeline() {
    let model = build_model();
    let ids: Vec<_> = model.clips().iter().map(|c| c.id).collect();
    let (mut engine, video) = video_master(model);
    engine.play().unwrap();

    // Mid first clip: source time is timeline time
    drive(&mut engine, 2.0);
    assert_eq!(engine.snapshot().absolute, Seconds::new(2.0));
    assert_eq!(engine.snapshot().selected, Some(ids[0]));

    // First boundary: swap into body.mp4
    drive(&mut engine, 5.0);
    assert!(matches!(engine.state(), SyncState::Transitioning { .. }));
    engine.handle_event(ElementRole::Driver, MediaEvent::DataReady);
    assert_eq!(engine.state(), SyncState::Playing);
    assert_eq!(engine.snapshot().selected, Some(ids[1]));
    assert_eq!(engine.snapshot().absolute, Seconds::new(5.0));

    // Mid second clip: driver reports body.mp4 source time
    drive(&mut engine, 1.0);
    assert_eq!(engine.snapshot().absolute, Seconds::new(6.0));

    // Second boundary, then run to the end of the last clip
    drive(&mut engine, 3.0);
    engine.handle_event(ElementRole::Driver, MediaEvent::DataReady);
    assert_eq!(engine.snapshot().selected, Some(ids[2]));
    drive(&mut engine, 7.0);

    assert_eq!(engine.state(), SyncState::EndOfTimeline);
    let snap = engine.snapshot();
    assert_eq!(snap.absolute, Seconds::new(15.0));
    assert!(!snap.playing);
    assert!(video.snapshot().paused);
}

#[test]
fn audio_master_walks_with_follower_in_tow() {
    let model = build_model();
    let ids: Vec<_> = model.clips().iter().map(|c| c.id).collect();
    let track = MediaSource::new("media/voiceover.mp3");
    let audio = ScriptedElement::with_source(track.clone(), Seconds::new(15.0));
    let video = ScriptedElement::with_source(MediaSource::new("media/intro.mp4"), Seconds::new(5.0));
    let mut engine = PlaybackEngine::audio_master(
        model,
        Box::new(audio.clone()),
        Box::new(video.clone()),
        track,
        Preloader::disabled(),
        EngineConfig::default(),
    );
    engine.play().unwrap();
    // Follower audio is muted under the default policy
    assert!(video.snapshot().muted);

    // Driver reports absolute time; crossing 5.0 swaps the follower
    drive(&mut engine, 2.0);
    video.set_time(Seconds::new(2.0));
    drive(&mut engine, 6.5);
    assert!(matches!(engine.state(), SyncState::Transitioning { .. }));
    engine.handle_event(ElementRole::Follower, MediaEvent::DataReady);

    let snap = engine.snapshot();
    assert_eq!(snap.selected, Some(ids[1]));
    assert_eq!(snap.within_clip, Seconds::new(1.5));
    // Follower was seeked to 1.5s into body.mp4
    assert_eq!(*video.snapshot().seeks.last().unwrap(), Seconds::new(1.5));

    // The track runs out
    engine.handle_event(ElementRole::Driver, MediaEvent::Ended);
    assert_eq!(engine.state(), SyncState::EndOfTimeline);
    assert!(audio.snapshot().paused);
    assert!(video.snapshot().paused);
}

// ── Edits during playback ──────────────────────────────────────

#[test]
fn trim_edit_mid_playback_shifts_boundaries() {
    let model = build_model();
    let ids: Vec<_> = model.clips().iter().map(|c| c.id).collect();
    let (mut engine, _video) = video_master(model);
    engine.play().unwrap();
    drive(&mut engine, 1.0);

    // User trims the playing clip down to 3s
    engine
        .model_mut()
        .update_clip(ids[0], ClipPatch::trim(Seconds::ZERO, Seconds::new(3.0)))
        .unwrap();

    // The next report past the new end transitions immediately
    drive(&mut engine, 3.0);
    assert!(matches!(engine.state(), SyncState::Transitioning { .. }));
    engine.handle_event(ElementRole::Driver, MediaEvent::DataReady);
    let snap = engine.snapshot();
    assert_eq!(snap.selected, Some(ids[1]));
    assert_eq!(snap.absolute, Seconds::new(3.0));
}

// ── Persistence to playback ────────────────────────────────────

#[test]
fn restored_project_plays_without_metadata_events() {
    let bytes = TimelineFile::new(&build_model(), None).to_json().unwrap();
    let restored = TimelineFile::from_json(&bytes).unwrap().into_model();

    let (mut engine, video) = video_master(restored);
    // Seeking works off file-provided durations alone
    engine.seek_to_absolute(Seconds::new(6.5)).unwrap();
    let snap = engine.snapshot();
    assert_eq!(snap.within_clip, Seconds::new(1.5));
    assert_eq!(
        video.snapshot().loads.last(),
        Some(&MediaSource::new("media/body.mp4"))
    );
}

// ── Preloading ─────────────────────────────────────────────────

#[test]
fn engine_preloads_the_successor_muted() {
    let made: Rc<RefCell<Vec<ScriptedElement>>> = Rc::default();
    let made2 = Rc::clone(&made);
    let factory: ElementFactory = Box::new(move || {
        let elem = ScriptedElement::new();
        made2.borrow_mut().push(elem.clone());
        Box::new(elem)
    });

    let model = build_model();
    let video = ScriptedElement::with_source(MediaSource::new("media/intro.mp4"), Seconds::new(5.0));
    let mut engine = PlaybackEngine::video_master(
        model,
        Box::new(video),
        Preloader::new(factory, std::time::Duration::ZERO),
        EngineConfig::default(),
    );
    engine.play().unwrap();
    engine.pump();

    let elems = made.borrow();
    assert_eq!(elems.len(), 1);
    let snap = elems[0].snapshot();
    assert!(snap.muted);
    assert_eq!(snap.loads, vec![MediaSource::new("media/body.mp4")]);
}
