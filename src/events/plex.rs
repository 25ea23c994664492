use crate::serde_helpers::null_as_default;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Plex event name that marks the end of playback.
pub const MEDIA_STOP: &str = "media.stop";

const METADATA_MARKER: &str = "/library/metadata/";

/// Plex webhook payload (the JSON carried in the `payload` form field)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlexWebhook {
    #[serde(default, deserialize_with = "null_as_default")]
    pub event: String,

    #[serde(rename = "Metadata", default)]
    pub metadata: Option<PlexMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlexMetadata {
    #[serde(default)]
    pub key: Option<String>,
}

impl PlexWebhook {
    /// Metadata resource path, empty when Plex did not send one.
    pub fn metadata_key(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|m| m.key.as_deref())
            .unwrap_or("")
    }

    pub fn is_stop(&self) -> bool {
        self.event == MEDIA_STOP
    }
}

/// Numeric identifier of a library item, used to query playback history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentKey(String);

impl ContentKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_numeric(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_digit())
}

/// Derive the content key from a Plex metadata resource path.
///
/// Prefers the segment after `/library/metadata/`, then falls back to the
/// segment after the last `/`. Returns `None` when neither is purely digits.
pub fn extract_content_key(path: &str) -> Option<ContentKey> {
    if let Some(idx) = path.find(METADATA_MARKER) {
        let candidate = &path[idx + METADATA_MARKER.len()..];
        if is_numeric(candidate) {
            return Some(ContentKey(candidate.to_string()));
        }
    }

    let (_, candidate) = path.rsplit_once('/')?;
    is_numeric(candidate).then(|| ContentKey(candidate.to_string()))
}
