//! Integration tests for the timeline subsystem.
//!
//! Exercises cross-crate interactions between reelsync-core and
//! reelsync-timeline: edits feeding the resolver, and persistence
//! feeding both.

use reelsync_core::{ReelSyncError, Seconds};
use reelsync_timeline::{
    resolver, Clip, ClipModel, ClipPatch, MediaSource, TimelineFile, TransitionInto,
    TransitionKind,
};

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

// ── Edits & resolution ─────────────────────────────────────────

#[test]
fn resolve_tracks_trim_edits() {
    let mut model = build_model();
    let first = model.clips()[0].id;

    // 6.5s falls 1.5s into the second clip
    let hit = resolver::resolve(model.clips(), Seconds::new(6.5)).unwrap();
    assert_eq!(hit.index, 1);
    assert_eq!(hit.offset, Seconds::new(1.5));

    // Trimming the first clip to 2s shifts every boundary
    model
        .update_clip(first, ClipPatch::trim(Seconds::new(0.0), Seconds::new(2.0)))
        .unwrap();
    assert_eq!(model.total_duration(), Seconds::new(12.0));
    let hit = resolver::resolve(model.clips(), Seconds::new(6.5)).unwrap();
    assert_eq!(hit.index, 2);
    assert_eq!(hit.offset, Seconds::new(1.5));
}

#[test]
fn resolve_tracks_reorder() {
    let mut model = build_model();
    let outro = model.clips()[2].id;

    model.reorder(2, 0);
    assert_eq!(model.clips()[0].id, outro);

    // The 7s outro now occupies [0, 7)
    let hit = resolver::resolve(model.clips(), Seconds::new(6.0)).unwrap();
    assert_eq!(hit.clip_id, outro);
    assert_eq!(hit.offset, Seconds::new(6.0));
}

#[test]
fn boundaries_are_cumulative_ends() {
    let model = build_model();
    assert_eq!(
        resolver::boundaries(model.clips()).as_slice(),
        &[Seconds::new(5.0), Seconds::new(8.0), Seconds::new(15.0)]
    );
}

#[test]
fn invalid_trim_never_reaches_the_resolver() {
    let mut model = build_model();
    let first = model.clips()[0].id;

    let err = model.update_clip(
        first,
        ClipPatch::trim(Seconds::new(4.0), Seconds::new(1.0)),
    );
    assert!(matches!(err, Err(ReelSyncError::InvalidTrim { .. })));

    // The stored window is untouched, so resolution is unchanged
    assert_eq!(model.total_duration(), Seconds::new(15.0));
    let hit = resolver::resolve(model.clips(), Seconds::new(2.0)).unwrap();
    assert_eq!(hit.index, 0);
}

#[test]
fn transition_metadata_survives_patching() {
    let mut model = build_model();
    let second = model.clips()[1].id;

    let fade = TransitionInto {
        kind: TransitionKind::Crossfade,
        duration: Seconds::new(0.5),
    };
    model
        .update_clip(second, ClipPatch::with_transition(Some(fade)))
        .unwrap();
    // A later trim patch leaves the transition alone
    model
        .update_clip(second, ClipPatch::trim_end(Seconds::new(2.0)))
        .unwrap();
    assert_eq!(model.clip(second).unwrap().transition, Some(fade));
}

// ── Persistence ────────────────────────────────────────────────

#[test]
fn saved_project_restores_and_resolves() {
    let model = build_model();
    let track = MediaSource::new("media/voiceover.mp3");
    let bytes = TimelineFile::new(&model, Some(track.clone()))
        .to_json()
        .unwrap();

    let file = TimelineFile::from_json(&bytes).unwrap();
    assert_eq!(file.audio_track, Some(track));
    let restored = file.into_model();

    // Durations came from the file, so resolution works with no media loaded
    assert_eq!(restored.total_duration(), Seconds::new(15.0));
    let hit = resolver::resolve(restored.clips(), Seconds::new(6.5)).unwrap();
    assert_eq!(hit.index, 1);
    assert_eq!(hit.offset, Seconds::new(1.5));
}

#[test]
fn restore_preserves_clip_identity_and_order() {
    let model = build_model();
    let ids: Vec<_> = model.clips().iter().map(|c| c.id).collect();

    let bytes = TimelineFile::new(&model, None).to_json().unwrap();
    let restored = TimelineFile::from_json(&bytes).unwrap().into_model();

    let restored_ids: Vec<_> = restored.clips().iter().map(|c| c.id).collect();
    assert_eq!(restored_ids, ids);
    assert_eq!(restored.selected(), Some(ids[0]));
}
