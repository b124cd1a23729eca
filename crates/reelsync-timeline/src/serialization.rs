//! Project persistence with versioning.
//!
//! JSON with a schema version field. A freshly deserialized clip list, with
//! `original_duration` values already populated, must drive the resolver and
//! clock with no media reload.

use reelsync_core::{ReelSyncError, Result};
use serde::{Deserialize, Serialize};

use crate::clip::{Clip, MediaSource};
use crate::model::ClipModel;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Versioned timeline file.
#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineFile {
    /// Schema version for migration.
    pub version: u32,
    /// Ordered, trimmed clip list.
    pub clips: Vec<Clip>,
    /// External audio track, when the project has one.
    #[serde(default)]
    pub audio_track: Option<MediaSource>,
}

impl TimelineFile {
    /// Snapshot a model (plus optional audio track) for saving.
    pub fn new(model: &ClipModel, audio_track: Option<MediaSource>) -> Self {
        Self {
            version: CURRENT_VERSION,
            clips: model.clips().to_vec(),
            audio_track,
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| ReelSyncError::Serialization(format!("failed to serialize timeline: {e}")))
    }

    /// Deserialize from JSON bytes.
    ///
    /// Files written by a newer schema are rejected. Version 0 files (before
    /// the audio track field existed) deserialize with `audio_track: None`.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| ReelSyncError::Serialization(format!("invalid JSON: {e}")))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        if version > CURRENT_VERSION {
            return Err(ReelSyncError::Serialization(format!(
                "timeline file version {version} is newer than supported version {CURRENT_VERSION}"
            )));
        }

        let mut file: TimelineFile = serde_json::from_value(raw)
            .map_err(|e| ReelSyncError::Serialization(format!("invalid timeline file: {e}")))?;
        file.version = CURRENT_VERSION;
        Ok(file)
    }

    /// Rebuild a live model from this file.
    pub fn into_model(self) -> ClipModel {
        ClipModel::from_clips(self.clips)
    }
}
