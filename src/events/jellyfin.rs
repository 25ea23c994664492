use crate::serde_helpers::null_as_default;
use serde::{Deserialize, Serialize};

pub const PLAYBACK_STOP_EVENT: &str = "playback.stop";
pub const PLAYBACK_STOP_NOTIFICATION: &str = "PlaybackStop";

/// Jellyfin webhook plugin payload
///
/// Fields the plugin template leaves unset may arrive as `null` and read as
/// their zero value.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JellyfinWebhook {
    #[serde(deserialize_with = "null_as_default")]
    pub event: String,
    #[serde(deserialize_with = "null_as_default")]
    pub item_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub item_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub media_status: JellyfinMediaStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub notification_type: String,
    #[serde(rename = "Name", deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub series_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub season_number: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub episode_number: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JellyfinMediaStatus {
    #[serde(deserialize_with = "null_as_default")]
    pub playback_status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub position_ticks: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub is_paused: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub played_to_completion: bool,
}

/// Item kinds the relay knows how to describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Episode,
    Movie,
    Other(String),
}

impl JellyfinWebhook {
    /// Either the event name or the notification type identifies a stop.
    pub fn is_stop(&self) -> bool {
        self.event == PLAYBACK_STOP_EVENT || self.notification_type == PLAYBACK_STOP_NOTIFICATION
    }

    pub fn played_to_completion(&self) -> bool {
        self.media_status.played_to_completion
    }

    pub fn item_kind(&self) -> ItemKind {
        match self.item_type.as_str() {
            "Episode" => ItemKind::Episode,
            "Movie" => ItemKind::Movie,
            other => ItemKind::Other(other.to_string()),
        }
    }
}
