//! Engine configuration.
//!
//! All tolerances and deadlines of the sync engine live here so hosts can
//! tune them per platform; defaults match typical media-element behavior.

use crate::time::Seconds;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to do with a video clip's own audio while an external audio track
/// drives playback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClipAudioPolicy {
    /// Mute per-clip audio; the external track is authoritative.
    Mute,
    /// Lower per-clip audio to the given gain (0.0 to 1.0).
    Duck { gain: f64 },
    /// Play per-clip audio at full volume alongside the track.
    Mix,
}

/// Tunable parameters of the playback engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Tolerance for detecting a clip-end boundary from coarse time reports.
    pub boundary_epsilon: Seconds,
    /// Minimum change between time reports worth recomputing state for.
    /// The boundary check itself is never rate-limited.
    pub min_tick_delta: Seconds,
    /// Follower drift beyond this is corrected with a direct time-set.
    pub drift_threshold: Seconds,
    /// Upper bound on how long a clip transition may hold its latch while
    /// waiting for a readiness signal.
    pub transition_deadline: Duration,
    /// Delay after an active-clip change before the preloader starts loading
    /// the successor, so it does not compete with the playing element.
    pub preload_delay: Duration,
    /// Per-clip audio policy during audio-master playback.
    pub clip_audio: ClipAudioPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            boundary_epsilon: Seconds::new(0.05),
            min_tick_delta: Seconds::new(0.1),
            drift_threshold: Seconds::new(0.15),
            transition_deadline: Duration::from_millis(300),
            preload_delay: Duration::from_millis(1500),
            clip_audio: ClipAudioPolicy::Mute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tolerances_in_range() {
        let cfg = EngineConfig::default();
        let eps = cfg.boundary_epsilon.as_f64();
        assert!((0.02..=0.1).contains(&eps));
        let drift = cfg.drift_threshold.as_f64();
        assert!((0.1..=0.2).contains(&drift));
        assert!(cfg.transition_deadline >= Duration::from_millis(100));
        assert!(cfg.transition_deadline <= Duration::from_millis(500));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let cfg = EngineConfig {
            clip_audio: ClipAudioPolicy::Duck { gain: 0.2 },
            ..EngineConfig::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.clip_audio, ClipAudioPolicy::Duck { gain: 0.2 });
        assert_eq!(back.boundary_epsilon, cfg.boundary_epsilon);
    }
}
