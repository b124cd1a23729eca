//! Clip resolution: absolute timeline time to (clip, offset).
//!
//! Pure functions over an ordered clip slice. Called on every sync tick and
//! on every seek; both paths must agree, so this is the only place the
//! interval walk is written.

use reelsync_core::Seconds;
use smallvec::SmallVec;

use crate::clip::{Clip, ClipId};

/// Result of resolving an absolute timeline time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedClip {
    /// Index of the clip in timeline order.
    pub index: usize,
    /// Id of the clip.
    pub clip_id: ClipId,
    /// Offset within the clip's trimmed window, in `[0, effective_duration]`.
    pub offset: Seconds,
}

/// Map an absolute timeline time to the clip containing it.
///
/// Each clip occupies the half-open interval `[prefix, prefix + duration)`,
/// so an exact boundary belongs to the clip that starts there — transitions
/// land on the new clip instead of re-triggering the old one's end
/// condition. The single exception is the end of the final clip: `t ==
/// total_duration` resolves to the last clip at its full offset, so a seek
/// clamped to the end still lands on a clip.
///
/// Returns `None` when `absolute` is past the end of the timeline.
/// Zero-duration clips (metadata not yet loaded) can never contain a time
/// and are skipped.
pub fn resolve(clips: &[Clip], absolute: Seconds) -> Option<ResolvedClip> {
    if absolute < Seconds::ZERO {
        return None;
    }
    let mut cumulative = Seconds::ZERO;
    let mut last_nonzero: Option<(usize, &Clip, Seconds)> = None;

    for (index, clip) in clips.iter().enumerate() {
        let duration = clip.effective_duration();
        if duration.is_zero() {
            continue;
        }
        let end = cumulative + duration;
        if absolute < end {
            return Some(ResolvedClip {
                index,
                clip_id: clip.id,
                offset: absolute - cumulative,
            });
        }
        last_nonzero = Some((index, clip, cumulative));
        cumulative = end;
    }

    // Final-boundary exception: exactly at total duration.
    if let Some((index, clip, prefix)) = last_nonzero {
        if absolute == cumulative {
            return Some(ResolvedClip {
                index,
                clip_id: clip.id,
                offset: absolute - prefix,
            });
        }
    }
    None
}

/// Sum of all effective durations.
pub fn total_duration(clips: &[Clip]) -> Seconds {
    clips
        .iter()
        .fold(Seconds::ZERO, |acc, c| acc + c.effective_duration())
}

/// Cumulative end boundaries of every non-zero clip, in timeline order.
/// Backs lookahead math and resolver tests.
pub fn boundaries(clips: &[Clip]) -> SmallVec<[Seconds; 8]> {
    let mut out = SmallVec::new();
    let mut cumulative = Seconds::ZERO;
    for clip in clips {
        let duration = clip.effective_duration();
        if duration.is_zero() {
            continue;
        }
        cumulative = cumulative + duration;
        out.push(cumulative);
    }
    out
}
