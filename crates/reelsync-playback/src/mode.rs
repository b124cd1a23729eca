//! Playback mode: which element drives the clock.
//!
//! Two mutually exclusive strategies. With an external audio track the audio
//! element drives and the video element follows; without one, the video
//! element drives itself. The elements live inside the mode variant, so
//! exactly one drive configuration can exist at a time — there is no
//! scattered boolean to desynchronize.

use crate::media::MediaElement;
use reelsync_timeline::MediaSource;

/// Discriminant of the active synchronization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// A distinct audio track drives the clock; video follows.
    AudioMaster,
    /// No separate audio track; the video element drives.
    VideoMaster,
}

impl PlaybackMode {
    /// Select the mode for a project based on whether it has an audio track.
    pub fn for_project(audio_track: Option<&MediaSource>) -> Self {
        if audio_track.is_some() {
            Self::AudioMaster
        } else {
            Self::VideoMaster
        }
    }
}

/// The active mode with its owned media elements.
pub enum ActiveMode {
    AudioMaster {
        /// Driving element, loaded with the external track.
        audio: Box<dyn MediaElement>,
        /// Following element, swapped per clip.
        video: Box<dyn MediaElement>,
        /// The external audio track source.
        track: MediaSource,
    },
    VideoMaster {
        /// Driving element, swapped per clip.
        video: Box<dyn MediaElement>,
    },
}

impl ActiveMode {
    pub fn kind(&self) -> PlaybackMode {
        match self {
            Self::AudioMaster { .. } => PlaybackMode::AudioMaster,
            Self::VideoMaster { .. } => PlaybackMode::VideoMaster,
        }
    }

    /// The element whose reported time is authoritative.
    pub fn driver_mut(&mut self) -> &mut dyn MediaElement {
        match self {
            Self::AudioMaster { audio, .. } => audio.as_mut(),
            Self::VideoMaster { video } => video.as_mut(),
        }
    }

    /// The element that renders clips (follower in audio-master, driver in
    /// video-master).
    pub fn video_mut(&mut self) -> &mut dyn MediaElement {
        match self {
            Self::AudioMaster { video, .. } => video.as_mut(),
            Self::VideoMaster { video } => video.as_mut(),
        }
    }

    pub fn video(&self) -> &dyn MediaElement {
        match self {
            Self::AudioMaster { video, .. } => video.as_ref(),
            Self::VideoMaster { video } => video.as_ref(),
        }
    }

    /// Pause every element this mode owns.
    pub fn pause_all(&mut self) {
        match self {
            Self::AudioMaster { audio, video, .. } => {
                audio.pause();
                video.pause();
            }
            Self::VideoMaster { video } => video.pause(),
        }
    }
}
