//! Tautulli-compatible history API.

mod client;
mod normalize;
mod types;

pub use client::HistoryClient;
pub use normalize::normalize_history_json;
pub use types::*;
