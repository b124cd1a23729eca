//! ReelSync Core - shared types for the playback engine
//!
//! Provides:
//! - Time values in float seconds with epsilon comparisons
//! - The workspace-wide error type
//! - Engine configuration

pub mod config;
pub mod error;
pub mod time;

pub use config::{ClipAudioPolicy, EngineConfig};
pub use error::{ReelSyncError, Result};
pub use time::Seconds;
