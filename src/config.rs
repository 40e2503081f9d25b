//! Application-level configuration: storage location, flush cadence, table
//! limits and the optional keep-alive target.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::rating::{DEFAULT_LEADERBOARD_SIZE, DEFAULT_RATING_CAPACITY};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CHERRYTY_BACK_CONFIG_PATH";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 30;
const DEFAULT_CLEANUP_MAX_AGE_DAYS: u64 = 30;
/// Free hosting tiers idle a service after 15 minutes without traffic.
const DEFAULT_KEEP_ALIVE_INTERVAL_SECS: u64 = 14 * 60;
const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Periodic self-ping target.
pub struct KeepAliveConfig {
    /// Public base URL of this service.
    pub url: String,
    /// Delay between two pings.
    pub interval: Duration,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    data_dir: PathBuf,
    flush_interval: Duration,
    rating_capacity: usize,
    leaderboard_size: usize,
    cleanup_max_age: Duration,
    keep_alive: Option<KeepAliveConfig>,
}

impl AppConfig {
    /// Load the configuration from disk and environment, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded configuration file");
                    raw
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    RawConfig::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                RawConfig::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                RawConfig::default()
            }
        };

        raw.with_env(|key| env::var(key).ok()).into()
    }

    /// Replace the data directory, keeping every other setting.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Directory holding the persisted snapshots.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Interval between two background flushes.
    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// Soft cap of the rating table.
    pub fn rating_capacity(&self) -> usize {
        self.rating_capacity
    }

    /// Number of entries served by the leaderboard endpoints.
    pub fn leaderboard_size(&self) -> usize {
        self.leaderboard_size
    }

    /// Default window used by the cleanup endpoint.
    pub fn cleanup_max_age(&self) -> Duration {
        self.cleanup_max_age
    }

    /// Keep-alive target, when one is configured.
    pub fn keep_alive(&self) -> Option<&KeepAliveConfig> {
        self.keep_alive.as_ref()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    data_dir: Option<PathBuf>,
    flush_interval_secs: Option<u64>,
    rating_capacity: Option<usize>,
    leaderboard_size: Option<usize>,
    cleanup_max_age_days: Option<u64>,
    keep_alive_url: Option<String>,
    keep_alive_interval_secs: Option<u64>,
}

impl RawConfig {
    /// Overlay environment variables on top of the file values.
    fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup("DATA_DIR").filter(|value| !value.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = lookup("KEEP_ALIVE_URL")
            .or_else(|| lookup("RENDER_EXTERNAL_URL"))
            .filter(|value| !value.trim().is_empty())
        {
            self.keep_alive_url = Some(url);
        }
        self
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let keep_alive = value
            .keep_alive_url
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .map(|url| KeepAliveConfig {
                url,
                interval: Duration::from_secs(
                    value
                        .keep_alive_interval_secs
                        .unwrap_or(DEFAULT_KEEP_ALIVE_INTERVAL_SECS)
                        .max(1),
                ),
            });

        Self {
            data_dir: value
                .data_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            flush_interval: Duration::from_secs(
                value
                    .flush_interval_secs
                    .unwrap_or(DEFAULT_FLUSH_INTERVAL_SECS)
                    .max(1),
            ),
            rating_capacity: value
                .rating_capacity
                .unwrap_or(DEFAULT_RATING_CAPACITY)
                .max(1),
            leaderboard_size: value.leaderboard_size.unwrap_or(DEFAULT_LEADERBOARD_SIZE),
            cleanup_max_age: Duration::from_secs(
                value
                    .cleanup_max_age_days
                    .unwrap_or(DEFAULT_CLEANUP_MAX_AGE_DAYS)
                    .saturating_mul(SECS_PER_DAY),
            ),
            keep_alive,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn parse(json: &str) -> RawConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.data_dir(), &PathBuf::from("data"));
        assert_eq!(config.flush_interval(), Duration::from_secs(30));
        assert_eq!(config.rating_capacity(), 200);
        assert_eq!(config.leaderboard_size(), 100);
        assert_eq!(
            config.cleanup_max_age(),
            Duration::from_secs(30 * 24 * 60 * 60)
        );
        assert!(config.keep_alive().is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let config: AppConfig = parse(
            r#"{
                "dataDir": "/var/lib/cherryty",
                "flushIntervalSecs": 5,
                "ratingCapacity": 50,
                "leaderboardSize": 10,
                "cleanupMaxAgeDays": 7,
                "keepAliveUrl": "https://cherryty.example/",
                "keepAliveIntervalSecs": 60
            }"#,
        )
        .into();

        assert_eq!(config.data_dir(), &PathBuf::from("/var/lib/cherryty"));
        assert_eq!(config.flush_interval(), Duration::from_secs(5));
        assert_eq!(config.rating_capacity(), 50);
        assert_eq!(config.leaderboard_size(), 10);
        assert_eq!(config.cleanup_max_age(), Duration::from_secs(7 * SECS_PER_DAY));
        assert_eq!(
            config.keep_alive(),
            Some(&KeepAliveConfig {
                url: "https://cherryty.example".into(),
                interval: Duration::from_secs(60),
            })
        );
    }

    #[test]
    fn with_data_dir_keeps_other_settings() {
        let config: AppConfig = parse(r#"{"flushIntervalSecs": 5}"#).into();
        let config = config.with_data_dir("/srv/saves");

        assert_eq!(config.data_dir(), &PathBuf::from("/srv/saves"));
        assert_eq!(config.flush_interval(), Duration::from_secs(5));
    }

    #[test]
    fn zero_intervals_are_raised_to_one_second() {
        let config: AppConfig = parse(r#"{"flushIntervalSecs": 0, "ratingCapacity": 0}"#).into();
        assert_eq!(config.flush_interval(), Duration::from_secs(1));
        assert_eq!(config.rating_capacity(), 1);
    }

    #[test]
    fn environment_overrides_file() {
        let env = HashMap::from([
            ("DATA_DIR", "/tmp/saves"),
            ("RENDER_EXTERNAL_URL", "https://render.example"),
        ]);
        let config: AppConfig = parse(r#"{"dataDir": "ignored"}"#)
            .with_env(|key| env.get(key).map(|value| value.to_string()))
            .into();

        assert_eq!(config.data_dir(), &PathBuf::from("/tmp/saves"));
        assert_eq!(
            config.keep_alive().map(|k| k.url.as_str()),
            Some("https://render.example")
        );
    }

    #[test]
    fn explicit_keep_alive_url_wins_over_render_url() {
        let env = HashMap::from([
            ("KEEP_ALIVE_URL", "https://mine.example"),
            ("RENDER_EXTERNAL_URL", "https://render.example"),
        ]);
        let config: AppConfig = RawConfig::default()
            .with_env(|key| env.get(key).map(|value| value.to_string()))
            .into();

        assert_eq!(
            config.keep_alive().map(|k| k.url.as_str()),
            Some("https://mine.example")
        );
    }
}
