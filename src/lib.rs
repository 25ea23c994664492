//! Watchrelay - records completed Plex/Jellyfin playback as JSON descriptors
//!
//! This library crate exposes the relay for the binary and integration tests.

pub mod config;
pub mod error;
pub mod events;
pub mod output;
pub mod relay;
mod serde_helpers;
pub mod server;
pub mod tautulli;
pub mod watched;

pub use error::{Error, Result};
