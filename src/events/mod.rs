//! Inbound stop notifications from the supported media servers.

pub mod jellyfin;
pub mod plex;

pub use jellyfin::{ItemKind, JellyfinMediaStatus, JellyfinWebhook};
pub use plex::{extract_content_key, ContentKey, PlexMetadata, PlexWebhook};

/// A playback notification from one of the supported media servers.
///
/// New sources are added as new variants and handled in `relay::process`.
#[derive(Debug, Clone)]
pub enum StopEvent {
    PlexStop(PlexWebhook),
    JellyfinStop(JellyfinWebhook),
}

impl StopEvent {
    /// Short source name for logs.
    pub fn source(&self) -> &'static str {
        match self {
            StopEvent::PlexStop(_) => "plex",
            StopEvent::JellyfinStop(_) => "jellyfin",
        }
    }
}
