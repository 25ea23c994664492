mod types;

pub use types::*;

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let defaults = Config::default();

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                tracing::warn!("Invalid PORT value: {}, using default {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        let api_timeout = match get("API_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    Error::Config(format!("Invalid API_TIMEOUT_SECS value: {raw}"))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let config = Config {
            host: get("BIND_ADDRESS").unwrap_or(defaults.host),
            port,
            api_host: get("API_HOST"),
            api_key: get("API_KEY"),
            output_dir: get("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            debug: get("DEBUG").map(|v| parse_flag(&v)).unwrap_or(false),
            api_timeout,
        };

        validate_config(&config)?;

        Ok(config)
    }

    /// Host and key of the history API, required by the Plex path.
    pub fn history_api(&self) -> Result<(&str, &str)> {
        match (self.api_host.as_deref(), self.api_key.as_deref()) {
            (Some(host), Some(key)) => Ok((host, key)),
            (None, _) => Err(Error::Config("API_HOST is not set".into())),
            (_, None) => Err(Error::Config("API_KEY is not set".into())),
        }
    }
}

/// Truthy values accepted by boolean environment flags such as `DEBUG`.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.port == 0 {
        return Err(Error::Config("Server port cannot be 0".into()));
    }

    if matches!(config.api_timeout, Some(d) if d.is_zero()) {
        return Err(Error::Config("API_TIMEOUT_SECS cannot be 0".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3333);
        assert_eq!(config.output_dir, PathBuf::from("/output"));
        assert_eq!(config.host, "0.0.0.0");
        assert!(config.api_host.is_none());
        assert!(config.api_key.is_none());
        assert!(!config.debug);
        assert!(config.api_timeout.is_none());
    }

    #[test]
    fn test_values_from_lookup() {
        let config = load(&[
            ("PORT", "8080"),
            ("API_HOST", "test-host"),
            ("API_KEY", "test-key"),
            ("OUTPUT_DIR", "/test-output"),
            ("DEBUG", "true"),
            ("API_TIMEOUT_SECS", "15"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.api_host.as_deref(), Some("test-host"));
        assert_eq!(config.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.output_dir, PathBuf::from("/test-output"));
        assert!(config.debug);
        assert_eq!(config.api_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.history_api().unwrap(), ("test-host", "test-key"));
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = load(&[("PORT", ""), ("OUTPUT_DIR", ""), ("API_HOST", "")]).unwrap();
        assert_eq!(config.port, 3333);
        assert_eq!(config.output_dir, PathBuf::from("/output"));
        assert!(config.api_host.is_none());
    }

    #[test]
    fn test_debug_flag_parsing() {
        assert!(load(&[("DEBUG", "TRUE")]).unwrap().debug);
        assert!(load(&[("DEBUG", "1")]).unwrap().debug);
        assert!(!load(&[("DEBUG", "false")]).unwrap().debug);
        assert!(!load(&[("DEBUG", "verbose")]).unwrap().debug);
    }

    #[test]
    fn test_unparsable_port_uses_default() {
        assert_eq!(load(&[("PORT", "abc")]).unwrap().port, DEFAULT_PORT);
        assert_eq!(load(&[("PORT", "70000")]).unwrap().port, DEFAULT_PORT);
        assert_eq!(load(&[("PORT", " 8080 ")]).unwrap().port, 8080);
    }

    #[test]
    fn test_zero_port_rejected() {
        assert!(matches!(load(&[("PORT", "0")]), Err(Error::Config(_))));
    }

    #[test]
    fn test_history_api_requires_host_and_key() {
        let config = load(&[("API_KEY", "k")]).unwrap();
        assert!(matches!(config.history_api(), Err(Error::Config(_))));

        let config = load(&[("API_HOST", "h")]).unwrap();
        assert!(matches!(config.history_api(), Err(Error::Config(_))));
    }

    #[test]
    fn test_api_key_redacted_when_serialized() {
        let config = load(&[("API_KEY", "super-secret")]).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("super-secret"));
    }
}
