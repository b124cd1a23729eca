//! ReelSync Playback - timeline playback synchronization engine
//!
//! Keeps a sequence of independently-loaded media elements in lock-step
//! with a single timeline clock:
//! - Media element abstraction and event plumbing
//! - The shared timeline clock
//! - Playback mode selection (audio-master / video-master)
//! - The sync loop state machine, seek controller, and preloader

pub mod clock;
pub mod media;
pub mod mode;
pub mod preload;
pub mod seek;
pub mod sync;

pub use clock::{ClockReader, ClockSnapshot, TimelineClock};
pub use media::{ElementRole, EventQueue, EventSender, MediaElement, MediaEvent};
pub use mode::{ActiveMode, PlaybackMode};
pub use preload::Preloader;
pub use sync::{PlaybackEngine, SyncState};
