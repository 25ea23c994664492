use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3333;
pub const DEFAULT_OUTPUT_DIR: &str = "/output";

fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Process configuration, built once at startup and shared read-only.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Address the HTTP listener binds to.
    pub host: String,

    pub port: u16,

    /// Host (and optional port) of the Tautulli-compatible history API.
    pub api_host: Option<String>,

    #[serde(serialize_with = "redact")]
    pub api_key: Option<String>,

    /// Directory that receives the watch descriptors.
    pub output_dir: PathBuf,

    /// Verbose logging only; never changes behavior.
    pub debug: bool,

    /// Explicit timeout for history API calls. `None` keeps the HTTP
    /// client's defaults.
    #[serde(with = "optional_secs")]
    pub api_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            api_host: None,
            api_key: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            debug: false,
            api_timeout: None,
        }
    }
}

fn redact<S: serde::Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(_) => s.serialize_str("********"),
        None => s.serialize_none(),
    }
}

mod optional_secs {
    use std::time::Duration;

    pub fn serialize<S: serde::Serializer>(
        value: &Option<Duration>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_u64(d.as_secs()),
            None => s.serialize_none(),
        }
    }
}
