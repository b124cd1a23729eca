//! Ordered clip container with selection.
//!
//! Insertion order is timeline order; there is no implicit sorting. All
//! mutation goes through `&mut self` methods, so readers holding a shared
//! reference never observe a half-applied edit.

use reelsync_core::{ReelSyncError, Result, Seconds};
use serde::{Deserialize, Serialize};

use crate::clip::{Clip, ClipId, ClipPatch};

/// The timeline: an ordered sequence of clips plus the active selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipModel {
    clips: Vec<Clip>,
    selected: Option<ClipId>,
}

impl ClipModel {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from an already-ordered clip list (e.g. a deserialized
    /// project). The first clip becomes selected.
    pub fn from_clips(clips: Vec<Clip>) -> Self {
        let selected = clips.first().map(|c| c.id);
        Self { clips, selected }
    }

    // ── Edits ───────────────────────────────────────────────────

    /// Append a clip to the timeline.
    ///
    /// A duplicate id is a no-op (duplicate drop events must not
    /// double-insert). The first clip auto-selects.
    pub fn add_clip(&mut self, clip: Clip) {
        if self.clips.iter().any(|c| c.id == clip.id) {
            return;
        }
        if self.clips.is_empty() {
            self.selected = Some(clip.id);
        }
        self.clips.push(clip);
    }

    /// Merge a partial update into a clip.
    ///
    /// Rejects a patch that would commit `start_time >= end_time`, leaving
    /// the clip untouched. Trim validation happens here, at the write path,
    /// because stored invalid windows are never self-healed downstream.
    pub fn update_clip(&mut self, id: ClipId, patch: ClipPatch) -> Result<()> {
        let clip = self
            .clips
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ReelSyncError::Timeline(format!("no clip with id {id}")))?;

        let start = patch.start_time.unwrap_or(clip.start_time);
        let end = patch.end_time.unwrap_or(clip.end_time);
        if start >= end {
            return Err(ReelSyncError::InvalidTrim { start, end });
        }

        clip.start_time = start;
        clip.end_time = end;
        if let Some(transition) = patch.transition {
            clip.transition = transition;
        }
        Ok(())
    }

    /// Remove a clip. Clears the selection if it was selected; the caller
    /// decides what to reselect.
    pub fn remove_clip(&mut self, id: ClipId) {
        self.clips.retain(|c| c.id != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    /// Move one clip from `from` to `to`, preserving the identity of the
    /// untouched clips. Out-of-range indices are no-ops.
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from >= self.clips.len() || to >= self.clips.len() || from == to {
            return;
        }
        let clip = self.clips.remove(from);
        self.clips.insert(to, clip);
    }

    /// Remove everything, including the selection.
    pub fn clear(&mut self) {
        self.clips.clear();
        self.selected = None;
    }

    // ── Selection ───────────────────────────────────────────────

    /// Select a clip by id. Unknown ids clear the selection.
    pub fn select(&mut self, id: ClipId) {
        self.selected = self.clips.iter().find(|c| c.id == id).map(|c| c.id);
    }

    /// Currently selected clip id.
    pub fn selected(&self) -> Option<ClipId> {
        self.selected
    }

    /// Currently selected clip.
    pub fn selected_clip(&self) -> Option<&Clip> {
        self.selected.and_then(|id| self.clip(id))
    }

    // ── Reads ───────────────────────────────────────────────────

    /// All clips in timeline order.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Find a clip by id.
    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Find a clip mutably by id.
    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    /// Index of a clip in timeline order.
    pub fn index_of(&self, id: ClipId) -> Option<usize> {
        self.clips.iter().position(|c| c.id == id)
    }

    /// Clip at a timeline index.
    pub fn clip_at(&self, index: usize) -> Option<&Clip> {
        self.clips.get(index)
    }

    /// The clip after `id` in timeline order, if any.
    pub fn successor_of(&self, id: ClipId) -> Option<&Clip> {
        let idx = self.index_of(id)?;
        self.clips.get(idx + 1)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    // ── Derived durations ───────────────────────────────────────

    /// Sum of all effective durations.
    pub fn total_duration(&self) -> Seconds {
        crate::resolver::total_duration(&self.clips)
    }

    /// Sum of effective durations of all clips before `id`.
    pub fn prefix_duration(&self, id: ClipId) -> Option<Seconds> {
        let idx = self.index_of(id)?;
        Some(
            self.clips[..idx]
                .iter()
                .fold(Seconds::ZERO, |acc, c| acc + c.effective_duration()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::MediaSource;

    fn clip(uri: &str, secs: f64) -> Clip {
        let mut c = Clip::new(MediaSource::new(uri));
        c.set_original_duration(Seconds::new(secs));
        c
    }

    #[test]
    fn test_first_clip_auto_selects() {
        let mut model = ClipModel::new();
        let a = clip("a.mp4", 5.0);
        let a_id = a.id;
        model.add_clip(a);
        assert_eq!(model.selected(), Some(a_id));

        // Second clip does not steal selection
        model.add_clip(clip("b.mp4", 3.0));
        assert_eq!(model.selected(), Some(a_id));
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut model = ClipModel::new();
        let a = clip("a.mp4", 5.0);
        model.add_clip(a.clone());
        model.add_clip(a);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_invalid_trim_rejected() {
        let mut model = ClipModel::new();
        let a = clip("a.mp4", 5.0);
        let a_id = a.id;
        model.add_clip(a);
        let before = model.clip(a_id).unwrap().effective_duration();

        let err = model.update_clip(
            a_id,
            ClipPatch::trim(Seconds::new(4.0), Seconds::new(2.0)),
        );
        assert!(matches!(err, Err(ReelSyncError::InvalidTrim { .. })));
        assert_eq!(model.clip(a_id).unwrap().effective_duration(), before);
    }

    #[test]
    fn test_partial_trim_validated_against_existing_field() {
        let mut model = ClipModel::new();
        let a = clip("a.mp4", 5.0);
        let a_id = a.id;
        model.add_clip(a);

        // end stays at 5.0, so start=6.0 is invalid even though the patch
        // alone looks fine
        let err = model.update_clip(a_id, ClipPatch::trim_start(Seconds::new(6.0)));
        assert!(err.is_err());

        model
            .update_clip(a_id, ClipPatch::trim_start(Seconds::new(1.0)))
            .unwrap();
        assert_eq!(
            model.clip(a_id).unwrap().effective_duration(),
            Seconds::new(4.0)
        );
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut model = ClipModel::new();
        let a = clip("a.mp4", 5.0);
        let a_id = a.id;
        model.add_clip(a);
        model.add_clip(clip("b.mp4", 3.0));

        model.remove_clip(a_id);
        assert_eq!(model.selected(), None);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_remove_unselected_keeps_selection() {
        let mut model = ClipModel::new();
        let a = clip("a.mp4", 5.0);
        let b = clip("b.mp4", 3.0);
        let (a_id, b_id) = (a.id, b.id);
        model.add_clip(a);
        model.add_clip(b);

        model.remove_clip(b_id);
        assert_eq!(model.selected(), Some(a_id));
    }

    #[test]
    fn test_reorder_preserves_identity() {
        let mut model = ClipModel::new();
        let ids: Vec<ClipId> = ["a.mp4", "b.mp4", "c.mp4"]
            .iter()
            .map(|uri| {
                let c = clip(uri, 1.0);
                let id = c.id;
                model.add_clip(c);
                id
            })
            .collect();

        model.reorder(0, 2);
        let order: Vec<ClipId> = model.clips().iter().map(|c| c.id).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[0]]);

        // Out of range is a no-op
        model.reorder(5, 0);
        let unchanged: Vec<ClipId> = model.clips().iter().map(|c| c.id).collect();
        assert_eq!(unchanged, order);
    }

    #[test]
    fn test_prefix_and_total_duration() {
        let mut model = ClipModel::new();
        let a = clip("a.mp4", 5.0);
        let b = clip("b.mp4", 3.0);
        let c = clip("c.mp4", 7.0);
        let (b_id, c_id) = (b.id, c.id);
        model.add_clip(a);
        model.add_clip(b);
        model.add_clip(c);

        assert_eq!(model.total_duration(), Seconds::new(15.0));
        assert_eq!(model.prefix_duration(b_id), Some(Seconds::new(5.0)));
        assert_eq!(model.prefix_duration(c_id), Some(Seconds::new(8.0)));
    }

    #[test]
    fn test_successor() {
        let mut model = ClipModel::new();
        let a = clip("a.mp4", 5.0);
        let b = clip("b.mp4", 3.0);
        let (a_id, b_id) = (a.id, b.id);
        model.add_clip(a);
        model.add_clip(b);

        assert_eq!(model.successor_of(a_id).unwrap().id, b_id);
        assert!(model.successor_of(b_id).is_none());
    }
}
