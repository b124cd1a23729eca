//! Error types for ReelSync.

use crate::time::Seconds;
use thiserror::Error;

/// Main error type for ReelSync operations.
#[derive(Error, Debug)]
pub enum ReelSyncError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Seek error: {0}")]
    Seek(String),

    #[error("Timeline error: {0}")]
    Timeline(String),

    #[error("Invalid trim window: start {start} must be before end {end}")]
    InvalidTrim { start: Seconds, end: Seconds },

    #[error("No clip selected")]
    NoClipSelected,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for ReelSync operations.
pub type Result<T> = std::result::Result<T, ReelSyncError>;
