use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::ContentKey;
use crate::tautulli::{normalize_history_json, HistoryRecord, HistoryResponse};
use reqwest::{Client, Url};

/// Client for the `get_history` command of a Tautulli-compatible API.
#[derive(Clone)]
pub struct HistoryClient {
    client: Client,
}

impl HistoryClient {
    pub fn new(config: &Config) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = config.api_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client: {}", e);
            Client::new()
        });

        Self { client }
    }

    /// Build the query for the most recent history entry of `key`.
    pub fn history_url(api_host: &str, api_key: &str, key: &ContentKey) -> Result<Url> {
        let base = format!("http://{}/api/v2", api_host.trim_end_matches('/'));
        let url = Url::parse_with_params(
            &base,
            &[
                ("apikey", api_key),
                ("cmd", "get_history"),
                ("rating_key", key.as_str()),
                ("order_column", "started"),
                ("order", "desc"),
                ("length", "1"),
            ],
        )
        .map_err(|e| Error::Config(format!("Invalid API_HOST {api_host:?}: {e}")))?;
        Ok(url)
    }

    /// Fetch the latest history records for a content key.
    ///
    /// Returns an empty list when the API reports no data.
    pub async fn fetch(
        &self,
        key: &ContentKey,
        api_host: &str,
        api_key: &str,
    ) -> Result<Vec<HistoryRecord>> {
        let url = Self::history_url(api_host, api_key, key)?;

        tracing::debug!(rating_key = %key, "Querying history API");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Error::UpstreamStatus {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let normalized = normalize_history_json(&body);
        let parsed: HistoryResponse = serde_json::from_str(&normalized)?;

        Ok(parsed.into_records())
    }
}
