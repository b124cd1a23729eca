//! Opportunistic preloading of the next clip.
//!
//! Keeps at most one detached, muted media element pointed at the immediate
//! successor of the active clip, so the transition at the boundary does not
//! pay the full load latency. Initiation is delayed briefly after an
//! active-clip change to avoid competing for bandwidth with the element
//! that is actually playing.

use crate::media::MediaElement;
use reelsync_timeline::{ClipId, ClipModel};
use std::time::Instant;
use tracing::debug;

/// Creates detached media elements for the preloader.
pub type ElementFactory = Box<dyn Fn() -> Box<dyn MediaElement>>;

struct PreloadSlot {
    clip_id: ClipId,
    element: Box<dyn MediaElement>,
}

/// One-slot lookahead loader.
pub struct Preloader {
    factory: Option<ElementFactory>,
    slot: Option<PreloadSlot>,
    /// Earliest instant a new load may start; re-armed on clip changes.
    armed_at: Option<Instant>,
    delay: std::time::Duration,
}

impl Preloader {
    /// Preloader that creates elements through `factory`.
    pub fn new(factory: ElementFactory, delay: std::time::Duration) -> Self {
        Self {
            factory: Some(factory),
            slot: None,
            armed_at: None,
            delay,
        }
    }

    /// Preloader that never loads anything. For hosts that cannot spare a
    /// detached element.
    pub fn disabled() -> Self {
        Self {
            factory: None,
            slot: None,
            armed_at: None,
            delay: std::time::Duration::ZERO,
        }
    }

    /// Note that the active clip changed: postpone the next load.
    pub fn note_active_clip(&mut self, now: Instant) {
        self.armed_at = Some(now + self.delay);
    }

    /// Id of the clip currently held in the slot, if any.
    pub fn preloaded_clip(&self) -> Option<ClipId> {
        self.slot.as_ref().map(|s| s.clip_id)
    }

    /// Reconcile the slot against the timeline.
    ///
    /// Discards a slot that is neither the immediate successor nor the
    /// current clip, keeps an in-flight slot for the successor untouched
    /// (dedup by id), and starts a new load once the arming delay elapsed.
    pub fn tick(&mut self, model: &ClipModel, active: Option<ClipId>, now: Instant) {
        let Some(active) = active else {
            self.release_all();
            return;
        };
        let successor = model.successor_of(active).map(|c| (c.id, c.source.clone()));

        // Drop a slot that no longer matches the timeline.
        if let Some(slot) = &self.slot {
            let keep = Some(slot.clip_id) == successor.as_ref().map(|(id, _)| *id)
                || slot.clip_id == active;
            if !keep {
                debug!(clip = %slot.clip_id, "discarding stale preload");
                self.release_all();
            }
        }

        let Some((next_id, next_source)) = successor else {
            return;
        };
        if self.slot.is_some() {
            return;
        }
        if let Some(armed_at) = self.armed_at {
            if now < armed_at {
                return;
            }
        }
        let Some(factory) = &self.factory else {
            return;
        };

        let mut element = factory();
        element.set_muted(true);
        element.load(&next_source);
        debug!(clip = %next_id, uri = %next_source.uri, "preloading successor");
        self.slot = Some(PreloadSlot {
            clip_id: next_id,
            element,
        });
    }

    /// Release every detached element, aborting in-flight loads.
    pub fn release_all(&mut self) {
        if let Some(mut slot) = self.slot.take() {
            slot.element.clear_source();
        }
    }
}

impl Drop for Preloader {
    fn drop(&mut self) {
        self.release_all();
    }
}
