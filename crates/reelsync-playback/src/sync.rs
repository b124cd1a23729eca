//! The sync loop: reconciles the driving element's reported time with the
//! timeline clock, performing clip-boundary transitions along the way.
//!
//! State machine: `Idle -> Playing -> Transitioning -> Playing | EndOfTimeline`.
//! A transition latches *before* any element call, so a second near-simultaneous
//! boundary report is a silent no-op. The latch carries a deadline: if no
//! readiness or failure signal arrives in time, it is force-cleared so a
//! stalled load can never wedge the machine.

use crate::clock::{ClockReader, ClockSnapshot, TimelineClock};
use crate::media::{ElementRole, EventQueue, EventSender, MediaEvent};
use crate::mode::{ActiveMode, PlaybackMode};
use crate::preload::Preloader;
use reelsync_core::{ClipAudioPolicy, EngineConfig, ReelSyncError, Result, Seconds};
use reelsync_timeline::{resolver, Clip, ClipId, ClipModel, MediaSource};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where the sync loop currently is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncState {
    /// Nothing playing.
    Idle,
    /// The driving element is advancing normally.
    Playing,
    /// A clip-boundary swap is in progress; time reports are ignored until
    /// the swap completes or the deadline passes.
    Transitioning { deadline: Instant },
    /// Past the last clip. Left only by an explicit seek or replay.
    EndOfTimeline,
}

/// A source swap waiting for the video element to signal readiness.
///
/// Hosts must not forward readiness events from superseded loads (a new
/// `load` call aborts the previous one); the generation is a second guard so
/// a swap cancelled engine-side can never be applied late.
#[derive(Debug, Clone)]
struct PendingSwap {
    generation: u64,
    clip_id: ClipId,
    /// Source-file position to seek once data is ready.
    seek_to: Seconds,
    /// Resume playback after the seek.
    resume: bool,
}

/// The playback engine: clip model, clock, mode, sync loop, preloader.
pub struct PlaybackEngine {
    model: ClipModel,
    clock: TimelineClock,
    config: EngineConfig,
    mode: ActiveMode,
    state: SyncState,
    preloader: Preloader,
    events: EventQueue,
    /// Last driver time actually processed; backs the tick rate limit.
    last_report: Option<Seconds>,
    pending_swap: Option<PendingSwap>,
    swap_generation: u64,
}

impl PlaybackEngine {
    /// Engine driven by an external audio track; video follows.
    pub fn audio_master(
        model: ClipModel,
        audio: Box<dyn crate::media::MediaElement>,
        video: Box<dyn crate::media::MediaElement>,
        track: MediaSource,
        preloader: Preloader,
        config: EngineConfig,
    ) -> Self {
        Self::with_mode(
            model,
            ActiveMode::AudioMaster {
                audio,
                video,
                track,
            },
            preloader,
            config,
        )
    }

    /// Engine driven by the video element itself (no separate audio track).
    pub fn video_master(
        model: ClipModel,
        video: Box<dyn crate::media::MediaElement>,
        preloader: Preloader,
        config: EngineConfig,
    ) -> Self {
        Self::with_mode(model, ActiveMode::VideoMaster { video }, preloader, config)
    }

    fn with_mode(
        model: ClipModel,
        mode: ActiveMode,
        preloader: Preloader,
        config: EngineConfig,
    ) -> Self {
        let clock = TimelineClock::new();
        if let Some(id) = model.selected() {
            let prefix = model.prefix_duration(id).unwrap_or(Seconds::ZERO);
            clock.apply(prefix, Seconds::ZERO, Some(id));
        }
        Self {
            model,
            clock,
            config,
            mode,
            state: SyncState::Idle,
            preloader,
            events: EventQueue::new(),
            last_report: None,
            pending_swap: None,
            swap_generation: 0,
        }
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn model(&self) -> &ClipModel {
        &self.model
    }

    /// Mutable timeline access for user edits. Position-dependent state is
    /// re-derived on the next tick or seek.
    pub fn model_mut(&mut self) -> &mut ClipModel {
        &mut self.model
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn mode_kind(&self) -> PlaybackMode {
        self.mode.kind()
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        self.clock.snapshot()
    }

    /// Read-only clock handle for UI consumers.
    pub fn clock_reader(&self) -> ClockReader {
        self.clock.reader()
    }

    /// Sender handle for a media element in the given role.
    pub fn event_sender(&self, role: ElementRole) -> EventSender {
        self.events.sender(role)
    }

    pub(crate) fn clock(&self) -> &TimelineClock {
        &self.clock
    }

    pub(crate) fn mode_mut(&mut self) -> &mut ActiveMode {
        &mut self.mode
    }

    pub(crate) fn preloader_mut(&mut self) -> &mut Preloader {
        &mut self.preloader
    }

    pub(crate) fn set_state(&mut self, state: SyncState) {
        self.state = state;
    }

    /// Forget the last processed report so the next tick is never rate-limited.
    pub(crate) fn reset_report_window(&mut self) {
        self.last_report = None;
    }

    // ── Transport ───────────────────────────────────────────────

    /// Start or resume playback of the selected clip.
    pub fn play(&mut self) -> Result<()> {
        if matches!(self.state, SyncState::EndOfTimeline) {
            self.seek_to_absolute(Seconds::ZERO)?;
        }
        let selected = self.model.selected().ok_or(ReelSyncError::NoClipSelected)?;
        let clip = self
            .model
            .clip(selected)
            .cloned()
            .ok_or(ReelSyncError::NoClipSelected)?;

        self.clock.set_playing(true);
        let within = self.clock.snapshot().within_clip;
        let source_time = clip.start_time + within;

        if let ActiveMode::AudioMaster { audio, track, .. } = &mut self.mode {
            let track = track.clone();
            if audio.current_source() != Some(track.clone()) {
                audio.load(&track);
            }
            audio.play();
        }
        self.apply_clip_audio_policy();
        if !self.swap_video_source_if_needed(&clip, source_time, true) {
            self.mode.video_mut().play();
        }
        self.state = SyncState::Playing;
        debug!(clip = %selected, "playback started");
        Ok(())
    }

    /// Halt playback, keeping the current position.
    pub fn pause(&mut self) {
        self.mode.pause_all();
        self.clock.set_playing(false);
        // An in-flight swap still completes, but must not resume playback.
        if let Some(pending) = &mut self.pending_swap {
            pending.resume = false;
        }
        if !matches!(self.state, SyncState::EndOfTimeline) {
            self.state = SyncState::Idle;
        }
    }

    /// Halt playback and rewind to the timeline start.
    pub fn stop(&mut self) {
        self.pause();
        self.cancel_pending_swap();
        let first = self.model.clips().first().map(|c| c.id);
        if let Some(id) = first {
            self.model.select(id);
        }
        self.clock.apply(Seconds::ZERO, Seconds::ZERO, first);
        if let Some(clip) = first.and_then(|id| self.model.clip(id)).cloned() {
            if let ActiveMode::AudioMaster { audio, .. } = &mut self.mode {
                audio.seek(Seconds::ZERO);
            }
            if self.mode.video().current_source() == Some(clip.source.clone()) {
                self.mode.video_mut().seek(clip.start_time);
            }
        }
        self.last_report = None;
        self.state = SyncState::Idle;
    }

    /// Switch synchronization strategy. Not hot-swappable: the active loop
    /// is torn down and the clock reset to the timeline start.
    pub fn set_mode(&mut self, mode: ActiveMode) {
        self.mode.pause_all();
        self.cancel_pending_swap();
        self.preloader.release_all();
        self.mode = mode;
        let first = self.model.clips().first().map(|c| c.id);
        if let Some(id) = first {
            self.model.select(id);
        }
        self.clock.reset();
        self.clock.apply(Seconds::ZERO, Seconds::ZERO, first);
        self.last_report = None;
        self.state = SyncState::Idle;
        info!(mode = ?self.mode.kind(), "playback mode switched; clock reset to start");
    }

    // ── Event intake ────────────────────────────────────────────

    /// Drain queued media events and run periodic housekeeping (latch
    /// deadline, preloader). Hosts call this from their tick.
    pub fn pump(&mut self) {
        let now = Instant::now();
        while let Some((role, event)) = self.events.try_recv() {
            self.dispatch(role, event, now);
        }
        self.poll(now);
    }

    /// Deliver one event directly, bypassing the queue.
    pub fn handle_event(&mut self, role: ElementRole, event: MediaEvent) {
        let now = Instant::now();
        self.dispatch(role, event, now);
        self.poll(now);
    }

    fn poll(&mut self, now: Instant) {
        self.check_deadline(now);
        self.preloader.tick(&self.model, self.model.selected(), now);
    }

    fn dispatch(&mut self, role: ElementRole, event: MediaEvent, now: Instant) {
        match event {
            MediaEvent::TimeUpdate(t) if role == ElementRole::Driver => self.on_driver_time(t, now),
            MediaEvent::Ended if role == ElementRole::Driver => self.on_driver_ended(now),
            MediaEvent::Seeked(t) if role == ElementRole::Driver => {
                // Re-base the rate-limit window at the settled position.
                self.last_report = Some(t);
            }
            MediaEvent::DataReady if role == self.video_role() => self.on_video_data_ready(),
            MediaEvent::MetadataReady { duration } => self.on_metadata(role, duration),
            MediaEvent::PlayRejected(reason) => self.on_play_rejected(role, reason),
            MediaEvent::Error(message) => self.on_media_error(role, message, now),
            _ => {}
        }
    }

    // ── The loop ────────────────────────────────────────────────

    fn on_driver_time(&mut self, t: Seconds, now: Instant) {
        match self.state {
            SyncState::Transitioning { .. } => {
                // Duplicate boundary reports while latched are silent no-ops.
                self.check_deadline(now);
            }
            SyncState::Playing => match self.mode.kind() {
                PlaybackMode::AudioMaster => self.tick_audio_master(t, now),
                PlaybackMode::VideoMaster => self.tick_video_master(t, now),
            },
            SyncState::Idle | SyncState::EndOfTimeline => {}
        }
    }

    /// Audio-master: the driver reports absolute timeline time.
    fn tick_audio_master(&mut self, absolute: Seconds, now: Instant) {
        let total = self.model.total_duration();
        if total.is_zero() {
            return;
        }
        if absolute.at_or_after(total, self.config.boundary_epsilon) {
            self.enter_end_of_timeline();
            return;
        }
        let Some(hit) = resolver::resolve(self.model.clips(), absolute) else {
            self.enter_end_of_timeline();
            return;
        };
        if Some(hit.clip_id) != self.model.selected() {
            self.begin_transition(hit.clip_id, hit.offset, absolute, now);
            return;
        }
        if self.skip_report(absolute) {
            return;
        }
        self.last_report = Some(absolute);
        self.clock.apply(absolute, hit.offset, Some(hit.clip_id));
        self.correct_follower_drift(hit.clip_id, hit.offset);
    }

    /// Video-master: the driver reports time within the current clip's source.
    fn tick_video_master(&mut self, t: Seconds, now: Instant) {
        let Some(selected) = self.model.selected() else {
            return;
        };
        let Some(clip) = self.model.clip(selected).cloned() else {
            return;
        };
        if !clip.end_time.is_zero() && t.at_or_after(clip.end_time, self.config.boundary_epsilon) {
            self.advance_past(selected, now);
            return;
        }
        if self.skip_report(t) {
            return;
        }
        self.last_report = Some(t);
        let relative = (t - clip.start_time).max_zero();
        let Some(prefix) = self.model.prefix_duration(selected) else {
            return;
        };
        self.clock.apply(prefix + relative, relative, Some(selected));
    }

    /// True when this report changed too little to be worth processing.
    /// Boundary checks happen before this, so a boundary is never skipped.
    fn skip_report(&self, t: Seconds) -> bool {
        match self.last_report {
            Some(prev) => t.abs_diff(prev) < self.config.min_tick_delta,
            None => false,
        }
    }

    /// Keep the follower within the drift threshold of the driver-derived
    /// position. Runs every steady-state tick, independent of transitions.
    fn correct_follower_drift(&mut self, clip_id: ClipId, offset: Seconds) {
        let Some((expected, source)) = self
            .model
            .clip(clip_id)
            .map(|c| (c.start_time + offset, c.source.clone()))
        else {
            return;
        };
        let threshold = self.config.drift_threshold;
        if let ActiveMode::AudioMaster { video, .. } = &mut self.mode {
            // Never time-set an element whose source swap is still pending.
            if video.current_source() != Some(source) {
                return;
            }
            let drift = video.current_time().abs_diff(expected);
            if drift > threshold {
                debug!(drift = %drift, "correcting follower drift");
                video.seek(expected);
            }
        }
    }

    fn on_driver_ended(&mut self, now: Instant) {
        if !matches!(self.state, SyncState::Playing) {
            return;
        }
        match self.mode.kind() {
            PlaybackMode::AudioMaster => self.enter_end_of_timeline(),
            PlaybackMode::VideoMaster => {
                if let Some(selected) = self.model.selected() {
                    self.advance_past(selected, now);
                }
            }
        }
    }

    // ── Transitions ─────────────────────────────────────────────

    /// Move to the clip after `current`, or finish the timeline.
    fn advance_past(&mut self, current: ClipId, now: Instant) {
        match self.model.successor_of(current).map(|c| c.id) {
            Some(next_id) => {
                let absolute = self.model.prefix_duration(next_id).unwrap_or(Seconds::ZERO);
                self.begin_transition(next_id, Seconds::ZERO, absolute, now);
            }
            None => self.enter_end_of_timeline(),
        }
    }

    /// Switch the active clip. The latch is set synchronously, before any
    /// element call, closing the double-fire race window.
    fn begin_transition(&mut self, next_id: ClipId, offset: Seconds, absolute: Seconds, now: Instant) {
        self.state = SyncState::Transitioning {
            deadline: now + self.config.transition_deadline,
        };
        let Some(next) = self.model.clip(next_id).cloned() else {
            self.state = SyncState::Playing;
            return;
        };
        debug!(clip = %next_id, at = %absolute, "clip transition");
        self.model.select(next_id);
        self.clock.apply(absolute, offset, Some(next_id));
        self.preloader.note_active_clip(now);

        let resume = self.clock.snapshot().playing;
        let seek_to = next.start_time + offset;
        if self.swap_video_source_if_needed(&next, seek_to, resume) {
            self.apply_clip_audio_policy();
            // Seek and resume run in the DataReady handler; seeking an
            // unloaded source yields an undefined position.
            return;
        }
        // Same source already loaded: seek directly, no reload.
        self.mode.video_mut().seek(seek_to);
        if resume {
            self.mode.video_mut().play();
        }
        self.finish_transition();
    }

    fn finish_transition(&mut self) {
        self.last_report = None;
        self.state = SyncState::Playing;
    }

    fn enter_end_of_timeline(&mut self) {
        let total = self.model.total_duration();
        debug!(total = %total, "end of timeline");
        self.mode.pause_all();
        self.clock.set_playing(false);
        // The clock stays at the final position.
        if let Some(hit) = resolver::resolve(self.model.clips(), total) {
            self.model.select(hit.clip_id);
            self.clock.apply(total, hit.offset, Some(hit.clip_id));
        }
        self.cancel_pending_swap();
        self.state = SyncState::EndOfTimeline;
    }

    // ── Source swaps ────────────────────────────────────────────

    fn video_role(&self) -> ElementRole {
        match self.mode.kind() {
            PlaybackMode::AudioMaster => ElementRole::Follower,
            PlaybackMode::VideoMaster => ElementRole::Driver,
        }
    }

    /// Begin loading `clip`'s source on the video element when it differs
    /// from what is loaded. Returns true when a swap is now pending.
    pub(crate) fn swap_video_source_if_needed(
        &mut self,
        clip: &Clip,
        seek_to: Seconds,
        resume: bool,
    ) -> bool {
        if self.mode.video().current_source() == Some(clip.source.clone()) {
            return false;
        }
        self.mode.video_mut().load(&clip.source);
        self.swap_generation += 1;
        self.pending_swap = Some(PendingSwap {
            generation: self.swap_generation,
            clip_id: clip.id,
            seek_to,
            resume,
        });
        true
    }

    pub(crate) fn cancel_pending_swap(&mut self) {
        // Bump so a late readiness event can never apply a stale swap.
        self.swap_generation += 1;
        self.pending_swap = None;
    }

    fn on_video_data_ready(&mut self) {
        let Some(pending) = self.pending_swap.take() else {
            return;
        };
        if pending.generation != self.swap_generation {
            return;
        }
        self.mode.video_mut().seek(pending.seek_to);
        if pending.resume {
            self.mode.video_mut().play();
        }
        if matches!(self.state, SyncState::Transitioning { .. }) {
            self.finish_transition();
        }
    }

    /// Force-clear a latch whose readiness signal never arrived.
    fn check_deadline(&mut self, now: Instant) {
        if let SyncState::Transitioning { deadline } = self.state {
            if now >= deadline {
                warn!("transition deadline expired; force-clearing latch");
                self.cancel_pending_swap();
                self.state = if self.clock.snapshot().playing {
                    SyncState::Playing
                } else {
                    SyncState::Idle
                };
            }
        }
    }

    // ── Failure handling ────────────────────────────────────────

    fn on_play_rejected(&mut self, role: ElementRole, reason: String) {
        if role == ElementRole::Preload {
            return;
        }
        warn!(?role, %reason, "play request rejected; waiting for a user gesture");
        // The transition already completed (source swapped, time set); only
        // playback stalls.
        self.mode.pause_all();
        self.clock.set_playing(false);
        if let Some(pending) = &mut self.pending_swap {
            pending.resume = false;
        }
        if !matches!(self.state, SyncState::EndOfTimeline) {
            self.state = SyncState::Idle;
        }
    }

    fn on_media_error(&mut self, role: ElementRole, message: String, now: Instant) {
        warn!(?role, %message, "media element error");
        if role == ElementRole::Preload {
            self.preloader.release_all();
            return;
        }
        if matches!(self.state, SyncState::Transitioning { .. }) {
            // The clip being transitioned into cannot load; skip it rather
            // than wait for a readiness signal that will never come.
            let failed = self
                .pending_swap
                .as_ref()
                .map(|p| p.clip_id)
                .or_else(|| self.model.selected());
            self.cancel_pending_swap();
            match failed.and_then(|id| self.model.successor_of(id).map(|c| c.id)) {
                Some(next_id) => {
                    let absolute = self.model.prefix_duration(next_id).unwrap_or(Seconds::ZERO);
                    self.begin_transition(next_id, Seconds::ZERO, absolute, now);
                }
                None => self.enter_end_of_timeline(),
            }
            return;
        }
        self.mode.pause_all();
        self.clock.set_playing(false);
        if !matches!(self.state, SyncState::EndOfTimeline) {
            self.state = SyncState::Idle;
        }
    }

    // ── Metadata ────────────────────────────────────────────────

    /// Fill `original_duration` for clips referencing the source whose
    /// metadata just arrived. Only the first report per clip takes effect.
    fn on_metadata(&mut self, role: ElementRole, duration: Seconds) {
        let source = match role {
            ElementRole::Preload => self
                .preloader
                .preloaded_clip()
                .and_then(|id| self.model.clip(id))
                .map(|c| c.source.clone()),
            r if r == self.video_role() => self.mode.video().current_source(),
            // Audio track metadata carries no clip duration.
            _ => None,
        };
        let Some(source) = source else {
            return;
        };
        let ids: Vec<ClipId> = self
            .model
            .clips()
            .iter()
            .filter(|c| c.source == source && c.original_duration.is_none())
            .map(|c| c.id)
            .collect();
        for id in ids {
            if let Some(clip) = self.model.clip_mut(id) {
                clip.set_original_duration(duration);
                debug!(clip = %id, duration = %duration, "source metadata loaded");
            }
        }
    }

    /// Apply the configured per-clip audio policy to the follower.
    pub(crate) fn apply_clip_audio_policy(&mut self) {
        let policy = self.config.clip_audio;
        if let ActiveMode::AudioMaster { video, .. } = &mut self.mode {
            match policy {
                ClipAudioPolicy::Mute => video.set_muted(true),
                ClipAudioPolicy::Duck { gain } => {
                    video.set_muted(false);
                    video.set_volume(gain);
                }
                ClipAudioPolicy::Mix => {
                    video.set_muted(false);
                    video.set_volume(1.0);
                }
            }
        }
    }
}
