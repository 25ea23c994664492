//! Shared helpers for integration tests.
//!
//! [`TestHarness`] owns a temporary output directory and, when needed, a
//! wiremock server standing in for the history API.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use http_body_util::BodyExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use watchrelay::config::Config;
use watchrelay::server::{create_router, AppContext};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BOUNDARY: &str = "X";

pub struct TestHarness {
    pub output: TempDir,
    pub history: Option<MockServer>,
}

impl TestHarness {
    /// Harness without a history API configured.
    pub fn new() -> Self {
        Self {
            output: tempfile::tempdir().expect("failed to create temp dir"),
            history: None,
        }
    }

    /// Harness whose history API answers every `get_history` call with `response`.
    pub async fn with_history_response(response: ResponseTemplate) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2"))
            .and(query_param("cmd", "get_history"))
            .and(query_param("apikey", "test-key"))
            .respond_with(response)
            .mount(&server)
            .await;

        Self {
            output: tempfile::tempdir().expect("failed to create temp dir"),
            history: Some(server),
        }
    }

    pub async fn with_history(records: serde_json::Value) -> Self {
        Self::with_history_response(
            ResponseTemplate::new(200).set_body_json(history_envelope(records)),
        )
        .await
    }

    /// History API returning `body` verbatim as the response text.
    pub async fn with_history_text(body: &str) -> Self {
        Self::with_history_response(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string(body),
        )
        .await
    }

    pub fn config(&self) -> Config {
        Config {
            api_host: self.history.as_ref().map(|s| s.address().to_string()),
            api_key: Some("test-key".to_string()),
            output_dir: self.output.path().to_path_buf(),
            ..Config::default()
        }
    }

    pub fn router(&self) -> Router {
        create_router(AppContext::new(self.config()))
    }

    pub fn output_file(&self, name: &str) -> PathBuf {
        self.output.path().join(name)
    }

    pub fn output_files(&self) -> Vec<String> {
        list_files(self.output.path())
    }

    pub async fn history_calls(&self) -> usize {
        match &self.history {
            Some(server) => server.received_requests().await.map_or(0, |r| r.len()),
            None => 0,
        }
    }
}

pub fn history_envelope(records: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "response": {
            "result": "success",
            "message": null,
            "data": {
                "recordsFiltered": 1,
                "recordsTotal": 1,
                "data": records
            }
        }
    })
}

pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

pub fn multipart_body(field: &str, value: &str) -> String {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
    )
}

/// Plex-style request: the event JSON in the `payload` form field.
pub fn plex_request(uri: &str, payload: &serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body("payload", &payload.to_string())))
        .unwrap()
}

pub fn jellyfin_request(uri: &str, payload: &serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

pub fn plex_stop(key: &str) -> serde_json::Value {
    serde_json::json!({
        "event": "media.stop",
        "Metadata": { "key": key }
    })
}

pub fn jellyfin_stop(item_type: &str, played_to_completion: bool) -> serde_json::Value {
    serde_json::json!({
        "Event": "playback.stop",
        "ItemId": "12345",
        "ItemType": item_type,
        "MediaStatus": {
            "PlaybackStatus": "Stopped",
            "PositionTicks": 12345678,
            "IsPaused": false,
            "PlayedToCompletion": played_to_completion
        },
        "NotificationType": "PlaybackStop",
        "Name": "Test Episode",
        "SeriesName": "Test Series",
        "SeasonNumber": 1,
        "EpisodeNumber": 2
    })
}

pub fn watched_record() -> serde_json::Value {
    serde_json::json!({
        "full_title": "Test Show",
        "parent_media_index": 1,
        "media_index": 2,
        "watched_status": 1.0,
        "percent_complete": 98
    })
}

/// Helper to get response body as string
pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
