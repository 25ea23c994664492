//! Turning stop events into watch descriptors.

use crate::config::Config;
use crate::error::Result;
use crate::events::{extract_content_key, JellyfinWebhook, PlexWebhook, StopEvent};
use crate::output::DescriptorWriter;
use crate::tautulli::HistoryClient;
use crate::watched::{classify_jellyfin, is_watched, JellyfinVerdict, WatchEntry};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Why a valid event produced no descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum IgnoreReason {
    NotAStopEvent(String),
    NoMetadata,
    NoContentKey(String),
    NoHistory,
    NotWatched,
    NotCompleted,
    UnsupportedItem(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::NotAStopEvent(event) => write!(f, "not a stop event: {event}"),
            IgnoreReason::NoMetadata => f.write_str("no metadata key"),
            IgnoreReason::NoContentKey(path) => write!(f, "no content key in {path:?}"),
            IgnoreReason::NoHistory => f.write_str("no history entries"),
            IgnoreReason::NotWatched => f.write_str("not marked as watched"),
            IgnoreReason::NotCompleted => f.write_str("not played to completion"),
            IgnoreReason::UnsupportedItem(kind) => write!(f, "unsupported item type {kind:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ignored(IgnoreReason),
    /// At least one record was watched. `skipped` counts records that were
    /// skipped because they could not be resolved or written.
    Processed { written: Vec<PathBuf>, skipped: usize },
}

/// Request-independent collaborators needed to handle a stop event.
#[derive(Clone)]
pub struct Relay {
    config: Arc<Config>,
    history: HistoryClient,
    writer: DescriptorWriter,
}

impl Relay {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            history: HistoryClient::new(&config),
            writer: DescriptorWriter::new(config.output_dir.clone()),
            config,
        }
    }

    /// Handle one stop event.
    ///
    /// Errors are terminal for the request; per-record failures are logged
    /// and counted in [`Outcome::Processed`] instead.
    pub async fn process(&self, event: StopEvent) -> Result<Outcome> {
        let source = event.source();
        let outcome = match event {
            StopEvent::PlexStop(webhook) => self.process_plex(webhook).await?,
            StopEvent::JellyfinStop(webhook) => self.process_jellyfin(webhook).await,
        };

        if let Outcome::Ignored(reason) = &outcome {
            tracing::debug!(source, "Ignoring event: {}", reason);
        }

        Ok(outcome)
    }

    async fn process_plex(&self, webhook: PlexWebhook) -> Result<Outcome> {
        if !webhook.is_stop() {
            return Ok(Outcome::Ignored(IgnoreReason::NotAStopEvent(webhook.event)));
        }

        let path = webhook.metadata_key();
        if path.is_empty() {
            return Ok(Outcome::Ignored(IgnoreReason::NoMetadata));
        }

        let Some(key) = extract_content_key(path) else {
            return Ok(Outcome::Ignored(IgnoreReason::NoContentKey(path.to_string())));
        };

        let (api_host, api_key) = self.config.history_api()?;
        let records = self.history.fetch(&key, api_host, api_key).await?;

        if records.is_empty() {
            return Ok(Outcome::Ignored(IgnoreReason::NoHistory));
        }
        tracing::debug!("Found {} entries for {}", records.len(), path);

        let mut entries = Vec::new();
        let mut skipped = 0;
        for record in &records {
            if !is_watched(record) {
                tracing::debug!(
                    title = %record.full_title,
                    watched_status = record.watched_status,
                    "Media not marked as watched by Plex"
                );
                continue;
            }

            match WatchEntry::from_history(record) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(title = %record.full_title, "Skipping history record: {}", e);
                    skipped += 1;
                }
            }
        }

        if entries.is_empty() && skipped == 0 {
            return Ok(Outcome::Ignored(IgnoreReason::NotWatched));
        }

        tracing::info!("Media marked as watched by Plex");
        let (written, write_skips) = self.write_all(entries).await;
        Ok(Outcome::Processed {
            written,
            skipped: skipped + write_skips,
        })
    }

    async fn process_jellyfin(&self, webhook: JellyfinWebhook) -> Outcome {
        if !webhook.is_stop() {
            return Outcome::Ignored(IgnoreReason::NotAStopEvent(format!(
                "{}/{}",
                webhook.event, webhook.notification_type
            )));
        }

        match classify_jellyfin(&webhook) {
            JellyfinVerdict::NotCompleted => Outcome::Ignored(IgnoreReason::NotCompleted),
            JellyfinVerdict::Unsupported(kind) => {
                tracing::info!("Unsupported Jellyfin item type: {}", kind);
                Outcome::Ignored(IgnoreReason::UnsupportedItem(kind))
            }
            JellyfinVerdict::Watched(entry) => {
                tracing::info!(item_id = %webhook.item_id, "Media marked as watched by Jellyfin");
                let (written, skipped) = self.write_all(vec![entry]).await;
                Outcome::Processed { written, skipped }
            }
        }
    }

    async fn write_all(&self, entries: Vec<WatchEntry>) -> (Vec<PathBuf>, usize) {
        let mut written = Vec::with_capacity(entries.len());
        let mut skipped = 0;

        for entry in entries {
            match self.writer.write(&entry).await {
                Ok(path) => {
                    tracing::info!("Wrote watch descriptor {}", path.display());
                    written.push(path);
                }
                Err(e) => {
                    tracing::warn!(file = %entry.file_name, "Failed to write descriptor: {}", e);
                    skipped += 1;
                }
            }
        }

        (written, skipped)
    }
}
