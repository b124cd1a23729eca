//! Integration test crate for ReelSync.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on multiple reelsync crates to verify they work together.

#[cfg(test)]
mod timeline;

#[cfg(test)]
mod playback;
