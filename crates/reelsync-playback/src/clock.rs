//! The timeline clock: single source of truth for playback position.
//!
//! Holds the absolute timeline position together with the derived
//! (selected clip, offset within clip) pair. The three fields are only ever
//! written as one unit, so concurrent readers (UI, preloader) never observe
//! a clip id paired with a stale offset.

use parking_lot::RwLock;
use reelsync_core::Seconds;
use reelsync_timeline::ClipId;
use std::sync::Arc;

/// One consistent view of the clock.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClockSnapshot {
    /// Seconds elapsed across the concatenation of all effective durations.
    pub absolute: Seconds,
    /// Offset within the active clip's trimmed window.
    pub within_clip: Seconds,
    /// The clip currently considered active for playback.
    pub selected: Option<ClipId>,
    /// Whether playback is currently advancing.
    pub playing: bool,
}

/// Shared, atomically-updated timeline clock.
#[derive(Clone, Default)]
pub struct TimelineClock {
    inner: Arc<RwLock<ClockSnapshot>>,
}

impl TimelineClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a consistent copy of the clock.
    pub fn snapshot(&self) -> ClockSnapshot {
        *self.inner.read()
    }

    /// Read-only handle for UI consumers.
    pub fn reader(&self) -> ClockReader {
        ClockReader {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Update the position triple in one atomic step. The invariant
    /// `absolute == prefix_duration(selected) + within_clip` is the caller's
    /// to uphold; this method only guarantees no reader sees a torn write.
    pub fn apply(&self, absolute: Seconds, within_clip: Seconds, selected: Option<ClipId>) {
        let mut state = self.inner.write();
        state.absolute = absolute;
        state.within_clip = within_clip;
        state.selected = selected;
    }

    /// Flip the playing flag without touching the position.
    pub fn set_playing(&self, playing: bool) {
        self.inner.write().playing = playing;
    }

    /// Back to timeline start, nothing selected, not playing.
    pub fn reset(&self) {
        *self.inner.write() = ClockSnapshot::default();
    }
}

/// Cloneable read-only view of a [`TimelineClock`].
#[derive(Clone)]
pub struct ClockReader {
    inner: Arc<RwLock<ClockSnapshot>>,
}

impl ClockReader {
    pub fn snapshot(&self) -> ClockSnapshot {
        *self.inner.read()
    }
}
