//! ReelSync Timeline - clip model and resolution
//!
//! Implements the timeline data layer:
//! - Ordered sequence of trimmed clip references with selection
//! - Pure resolution of absolute timeline time to (clip, offset)
//! - Versioned project persistence

pub mod clip;
pub mod model;
pub mod resolver;
pub mod serialization;

pub use clip::{Clip, ClipId, ClipPatch, MediaSource, TransitionInto, TransitionKind};
pub use model::ClipModel;
pub use resolver::{resolve, total_duration, ResolvedClip};
pub use serialization::TimelineFile;
