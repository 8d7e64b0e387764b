use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use common::config::{LeaderboardConfig, RetryConfig, StorageConfig};

/// Application configuration shared by every front-end.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl AppConfig {
    /// Load from `$CROWN_CONFIG` (default `config/config`), then `CROWN__*` env vars.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CROWN_CONFIG").unwrap_or_else(|_| "config/config".to_string());
        Self::builder(File::with_name(&config_path).required(false))?
            // Override from environment (e.g., CROWN__LEADERBOARD__BACKEND_URL)
            .add_source(Environment::with_prefix("CROWN").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Load from one explicit file, without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::builder(File::from(path).required(true))?
            .build()?
            .try_deserialize()
    }

    fn builder(
        file: File<config::FileSourceFile, config::FileFormat>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("storage.url", "http://localhost:54321")?
            .set_default("storage.anon_key", "")?
            .set_default("leaderboard.list_timeout_ms", 5_000_i64)?
            .set_default("leaderboard.detail_timeout_ms", 10_000_i64)?
            .set_default("leaderboard.poll_interval_secs", 30_i64)?
            .set_default("retry.max_retries", 3_i64)?
            .set_default("retry.base_delay_ms", 1_000_i64)?
            .add_source(file))
    }
}
