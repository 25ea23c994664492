//! Unified error type for the relay.
//!
//! Every failure funnels into [`Error`], which carries enough context for the
//! webhook handlers to derive an HTTP status code via [`Error::http_status`].

use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The inbound webhook request could not be understood.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The history API could not be reached.
    #[error("History API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The history API answered with a non-success status.
    #[error("History API returned status {status}")]
    UpstreamStatus {
        /// HTTP status code returned upstream.
        status: u16,
    },

    /// The history API response was not valid JSON after normalization.
    #[error("Failed to decode history response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A season/episode index held text that is not a number.
    #[error("Invalid {field} value: {value:?}")]
    InvalidIndex {
        /// Field name as sent by the history API.
        field: &'static str,
        /// The offending raw value.
        value: String,
    },

    /// A descriptor file name would escape the output directory.
    #[error("Invalid descriptor file name: {0:?}")]
    InvalidFileName(String),

    /// Filesystem failure while writing a descriptor.
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::BadRequest(_) => 400,
            Error::Config(_)
            | Error::Transport(_)
            | Error::UpstreamStatus { .. }
            | Error::Decode(_)
            | Error::InvalidIndex { .. }
            | Error::InvalidFileName(_)
            | Error::Io { .. }
            | Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::Io`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
