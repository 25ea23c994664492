//! Deciding what counts as watched, and what gets written for it.

use crate::error::Result;
use crate::events::{ItemKind, JellyfinWebhook};
use crate::tautulli::HistoryRecord;
use serde::{Deserialize, Serialize};

/// Minimum `watched_status` for a history record to count as watched.
pub const WATCHED_THRESHOLD: f64 = 1.0;

/// The persisted form of a completed watch, with every field resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchDescriptor {
    pub full_title: String,
    pub parent_media_index: i64,
    pub media_index: i64,
    #[serde(serialize_with = "whole_as_integer")]
    pub watched_status: f64,
    pub percent_complete: i64,
}

/// Write `1.0` as `1` so descriptors match what the history API sends.
fn whole_as_integer<S>(value: &f64, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    const MAX_EXACT: f64 = (1u64 << 53) as f64;
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        s.serialize_i64(*value as i64)
    } else {
        s.serialize_f64(*value)
    }
}

/// A descriptor paired with the file name it is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchEntry {
    pub file_name: String,
    pub descriptor: WatchDescriptor,
}

/// Result of classifying a Jellyfin stop event.
#[derive(Debug, Clone, PartialEq)]
pub enum JellyfinVerdict {
    Watched(WatchEntry),
    NotCompleted,
    Unsupported(String),
}

pub fn episode_file_name(title: &str, season: i64, episode: i64) -> String {
    format!("{title} - S{season}E{episode}.json")
}

pub fn movie_file_name(title: &str) -> String {
    format!("{title}.json")
}

/// A history record is watched once its status reaches the threshold.
pub fn is_watched(record: &HistoryRecord) -> bool {
    record.watched_status >= WATCHED_THRESHOLD
}

impl WatchEntry {
    /// Resolve a watched history record into a descriptor.
    ///
    /// Fails when an index holds non-numeric text.
    pub fn from_history(record: &HistoryRecord) -> Result<Self> {
        let season = record.parent_media_index.resolve("parent_media_index")?;
        let episode = record.media_index.resolve("media_index")?;

        Ok(Self {
            file_name: episode_file_name(&record.full_title, season, episode),
            descriptor: WatchDescriptor {
                full_title: record.full_title.clone(),
                parent_media_index: season,
                media_index: episode,
                watched_status: record.watched_status,
                percent_complete: record.percent_complete,
            },
        })
    }
}

/// Classify a Jellyfin stop event. Completion comes from the event itself.
pub fn classify_jellyfin(event: &JellyfinWebhook) -> JellyfinVerdict {
    if !event.played_to_completion() {
        return JellyfinVerdict::NotCompleted;
    }

    match event.item_kind() {
        ItemKind::Episode if !event.series_name.is_empty() => {
            JellyfinVerdict::Watched(WatchEntry {
                file_name: episode_file_name(
                    &event.series_name,
                    event.season_number,
                    event.episode_number,
                ),
                descriptor: WatchDescriptor {
                    full_title: format!("{} - {}", event.series_name, event.title),
                    parent_media_index: event.season_number,
                    media_index: event.episode_number,
                    watched_status: WATCHED_THRESHOLD,
                    percent_complete: 100,
                },
            })
        }
        ItemKind::Movie => JellyfinVerdict::Watched(WatchEntry {
            file_name: movie_file_name(&event.title),
            descriptor: WatchDescriptor {
                full_title: event.title.clone(),
                parent_media_index: 0,
                media_index: 0,
                watched_status: WATCHED_THRESHOLD,
                percent_complete: 100,
            },
        }),
        _ => JellyfinVerdict::Unsupported(event.item_type.clone()),
    }
}
