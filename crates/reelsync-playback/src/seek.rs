//! Seeking: absolute timeline seeks and clip-relative seeks.
//!
//! A seek is the one operation allowed to move the clock backwards or jump
//! it forwards arbitrarily. It supersedes any in-flight transition swap,
//! updates the model selection and the clock in one step, and only then
//! touches the media elements.

use crate::mode::ActiveMode;
use crate::sync::{PlaybackEngine, SyncState};
use reelsync_core::{ReelSyncError, Result, Seconds};
use reelsync_timeline::{resolver, Clip};
use std::time::Instant;
use tracing::debug;

impl PlaybackEngine {
    /// Seek to an absolute timeline position, clamped to `[0, total]`.
    ///
    /// Re-resolves the target against the current clip list, so the mapping
    /// stays correct after edits. Idempotent: repeating the same seek leaves
    /// the clock unchanged.
    pub fn seek_to_absolute(&mut self, time: Seconds) -> Result<()> {
        let now = Instant::now();
        if self.model().is_empty() {
            return Err(ReelSyncError::Seek("timeline has no clips".into()));
        }
        let total = self.model().total_duration();
        let target = time.clamp(Seconds::ZERO, total);
        let hit = resolver::resolve(self.model().clips(), target)
            .ok_or_else(|| ReelSyncError::Seek(format!("no clip at {target}")))?;
        let Some(clip) = self.model().clip(hit.clip_id).cloned() else {
            return Err(ReelSyncError::Seek(format!("no clip at {target}")));
        };
        debug!(at = %target, clip = %hit.clip_id, "absolute seek");
        self.commit_seek(&clip, target, hit.offset, now);
        Ok(())
    }

    /// Seek within the selected clip's trimmed window. The offset is clamped
    /// to the clip's effective duration.
    ///
    /// Shares the element path with absolute seeks, but writes the clip
    /// offset directly instead of re-deriving it from a resolve.
    pub fn seek_to_relative(&mut self, offset: Seconds) -> Result<()> {
        let now = Instant::now();
        let selected = self
            .model()
            .selected()
            .ok_or(ReelSyncError::NoClipSelected)?;
        let clip = self
            .model()
            .clip(selected)
            .cloned()
            .ok_or(ReelSyncError::NoClipSelected)?;
        let clamped = offset.clamp(Seconds::ZERO, clip.effective_duration());
        let prefix = self
            .model()
            .prefix_duration(selected)
            .unwrap_or(Seconds::ZERO);
        debug!(within = %clamped, clip = %selected, "relative seek");
        self.commit_seek(&clip, prefix + clamped, clamped, now);
        Ok(())
    }

    /// The shared tail of every seek: supersede pending swaps, publish the
    /// new position atomically, then bring the elements to it.
    fn commit_seek(&mut self, clip: &Clip, absolute: Seconds, within: Seconds, now: Instant) {
        self.cancel_pending_swap();
        self.model_mut().select(clip.id);
        self.clock().apply(absolute, within, Some(clip.id));
        self.preloader_mut().note_active_clip(now);
        self.reset_report_window();

        let resume = self.snapshot().playing;
        let source_time = clip.start_time + within;
        if let ActiveMode::AudioMaster { audio, .. } = self.mode_mut() {
            audio.seek(absolute);
        }
        if self.swap_video_source_if_needed(clip, source_time, resume) {
            self.apply_clip_audio_policy();
        } else {
            self.mode_mut().video_mut().seek(source_time);
        }
        // Seeking always leaves end-of-timeline and any latched transition.
        self.set_state(if resume {
            SyncState::Playing
        } else {
            SyncState::Idle
        });
    }
}
