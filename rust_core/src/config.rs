//! Monitor configuration loaded once at startup from a JSON file.
//!
//! Every field has a built-in default. A missing or unparsable file is not fatal:
//! [`load_config`] logs the problem and hands back [`MonitorConfig::default`].

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_API_BASE_URL: &str = "https://app.matchplay.events/api";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    pub api: ApiConfig,
    pub notifications: NotificationConfig,
    pub slack: SlackConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub poll_interval_seconds: u64,
    pub base_url: String,
    pub request_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 300,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub standings_update_interval_minutes: u64,
    pub standings_top_n: usize,
    pub announce_tournament_start: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            standings_update_interval_minutes: 30,
            standings_top_n: 10,
            announce_tournament_start: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SlackConfig {
    /// Channel override; the webhook's own channel is used when absent
    pub channel: Option<String>,
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.api.poll_interval_seconds)
    }

    pub fn standings_interval(&self) -> Duration {
        Duration::from_secs(self.notifications.standings_update_interval_minutes * 60)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_seconds)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "api.poll_interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.api.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "api.request_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.notifications.standings_top_n == 0 {
            return Err(ConfigError::Invalid(
                "notifications.standings_top_n must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read and validate the config file, surfacing every failure.
pub fn try_load_config(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: MonitorConfig =
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

/// Load the config file, falling back to built-in defaults on any error.
pub fn load_config(path: &Path) -> MonitorConfig {
    match try_load_config(path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            error!("Failed to load config file: {}; using defaults", e);
            MonitorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(300));
        assert_eq!(config.standings_interval(), Duration::from_secs(30 * 60));
        assert_eq!(config.notifications.standings_top_n, 10);
        assert!(config.notifications.announce_tournament_start);
        assert_eq!(config.slack.channel, None);
    }

    #[test]
    fn test_full_file() {
        let file = write_config(
            r##"{
                "api": { "poll_interval_seconds": 60, "base_url": "http://localhost:9000/api", "request_timeout_seconds": 5 },
                "notifications": { "standings_update_interval_minutes": 15, "standings_top_n": 5, "announce_tournament_start": false },
                "slack": { "channel": "#league-night" }
            }"##,
        );

        let config = try_load_config(file.path()).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.standings_interval(), Duration::from_secs(15 * 60));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.api.base_url, "http://localhost:9000/api");
        assert_eq!(config.notifications.standings_top_n, 5);
        assert!(!config.notifications.announce_tournament_start);
        assert_eq!(config.slack.channel.as_deref(), Some("#league-night"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let file = write_config(r#"{ "api": { "poll_interval_seconds": 120 } }"#);

        let config = try_load_config(file.path()).unwrap();
        assert_eq!(config.api.poll_interval_seconds, 120);
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.notifications, NotificationConfig::default());
    }

    #[test]
    fn test_invalid_json_falls_back_to_defaults() {
        let file = write_config("{ \"api\": { \"poll_interval_seconds\": ");

        assert!(matches!(
            try_load_config(file.path()),
            Err(ConfigError::Parse { .. })
        ));
        assert_eq!(load_config(file.path()), MonitorConfig::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.json");

        assert!(matches!(try_load_config(&path), Err(ConfigError::Read { .. })));
        assert_eq!(load_config(&path), MonitorConfig::default());
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let file = write_config(r#"{ "api": { "poll_interval_seconds": 0 } }"#);

        assert!(matches!(
            try_load_config(file.path()),
            Err(ConfigError::Invalid(_))
        ));
        assert_eq!(load_config(file.path()), MonitorConfig::default());
    }

    #[test]
    fn test_wrong_field_type_is_parse_error() {
        let file = write_config(r#"{ "notifications": { "standings_top_n": "ten" } }"#);

        assert!(matches!(
            try_load_config(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
