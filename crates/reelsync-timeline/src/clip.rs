//! Clip types for the timeline.

use reelsync_core::Seconds;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque clip identity, stable across reorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(Uuid);

impl ClipId {
    /// Generate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A loadable media source handle.
///
/// Equality is by URI: the sync loop compares the source currently loaded on
/// an element against a clip's source to decide whether a swap is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    /// Location the media-library collaborator resolves to real bytes.
    pub uri: String,
}

impl MediaSource {
    /// Create a source handle from a URI.
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// Kind of visual transition into a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    Crossfade,
}

/// Transition applied *into* a clip from its predecessor.
/// Absent means a hard cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionInto {
    pub kind: TransitionKind,
    pub duration: Seconds,
}

/// A clip placed on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: ClipId,
    /// Reference to source media
    pub source: MediaSource,
    /// Trim window start within the source
    pub start_time: Seconds,
    /// Trim window end within the source
    pub end_time: Seconds,
    /// Untrimmed source duration, filled once on first metadata load
    pub original_duration: Option<Seconds>,
    /// Optional transition from the predecessor into this clip
    pub transition: Option<TransitionInto>,
}

impl Clip {
    /// Create a new clip for a source whose metadata is not yet known.
    pub fn new(source: MediaSource) -> Self {
        Self {
            id: ClipId::new(),
            source,
            start_time: Seconds::ZERO,
            end_time: Seconds::ZERO,
            original_duration: None,
            transition: None,
        }
    }

    /// Trimmed duration of this clip on the timeline.
    ///
    /// Before metadata arrives the trim window is unset; fall back to the
    /// original duration, or zero when that too is unknown.
    pub fn effective_duration(&self) -> Seconds {
        let trimmed = self.end_time - self.start_time;
        if trimmed.as_f64() > 0.0 {
            trimmed
        } else {
            self.original_duration.unwrap_or(Seconds::ZERO)
        }
    }

    /// Record the source duration discovered from media metadata.
    ///
    /// Only the first call takes effect. If the trim window is still unset,
    /// it expands to the full source.
    pub fn set_original_duration(&mut self, duration: Seconds) {
        if self.original_duration.is_some() {
            return;
        }
        self.original_duration = Some(duration);
        if self.end_time.is_zero() {
            self.start_time = Seconds::ZERO;
            self.end_time = duration;
        }
    }

    /// Whether the trim window has valid bounds.
    pub fn has_valid_trim(&self) -> bool {
        self.start_time < self.end_time
    }
}

/// Partial update of a clip's mutable fields.
#[derive(Debug, Clone, Default)]
pub struct ClipPatch {
    pub start_time: Option<Seconds>,
    pub end_time: Option<Seconds>,
    pub transition: Option<Option<TransitionInto>>,
}

impl ClipPatch {
    /// Patch that moves the trim start handle.
    pub fn trim_start(start: Seconds) -> Self {
        Self {
            start_time: Some(start),
            ..Self::default()
        }
    }

    /// Patch that moves the trim end handle.
    pub fn trim_end(end: Seconds) -> Self {
        Self {
            end_time: Some(end),
            ..Self::default()
        }
    }

    /// Patch that sets both trim handles.
    pub fn trim(start: Seconds, end: Seconds) -> Self {
        Self {
            start_time: Some(start),
            end_time: Some(end),
            ..Self::default()
        }
    }

    /// Patch that sets or clears the transition into this clip.
    pub fn with_transition(transition: Option<TransitionInto>) -> Self {
        Self {
            transition: Some(transition),
            ..Self::default()
        }
    }
}
