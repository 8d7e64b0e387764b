use std::time::Duration;

use serde::Deserialize;

/// Backend URL the front-end falls back to when none is configured.
/// Pointing at it means the leaderboard service is not deployed.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";

/// Storage API (PostgREST) connection settings.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Project base URL; tables live under `{url}/rest/v1`. Default: "http://localhost:54321".
    #[serde(default = "default_storage_url")]
    pub url: String,
    /// Public anon key sent as `apikey` and bearer token. Default: empty.
    #[serde(default)]
    pub anon_key: String,
    /// Per-request timeout in milliseconds. Default: 10000.
    #[serde(default = "default_storage_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_storage_url() -> String {
    "http://localhost:54321".into()
}
fn default_storage_timeout_ms() -> u64 {
    10_000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: default_storage_url(),
            anon_key: String::new(),
            timeout_ms: default_storage_timeout_ms(),
        }
    }
}

impl StorageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// External leaderboard service settings.
#[derive(Debug, Deserialize, Clone)]
pub struct LeaderboardConfig {
    /// Service base URL. Unset, blank, or [`DEFAULT_BACKEND_URL`] disables leaderboards.
    #[serde(default)]
    pub backend_url: Option<String>,
    /// Timeout for the per-card fetches on the contest list. Default: 5000.
    #[serde(default = "default_list_timeout_ms")]
    pub list_timeout_ms: u64,
    /// Timeout for the public leaderboard page fetch. Default: 10000.
    #[serde(default = "default_detail_timeout_ms")]
    pub detail_timeout_ms: u64,
    /// Poll period while watching a leaderboard. Default: 30.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Rows requested for the public leaderboard page. Default: 200.
    #[serde(default = "default_detail_limit")]
    pub detail_limit: u32,
}

fn default_list_timeout_ms() -> u64 {
    5_000
}
fn default_detail_timeout_ms() -> u64 {
    10_000
}
fn default_poll_interval_secs() -> u64 {
    30
}
fn default_detail_limit() -> u32 {
    200
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            list_timeout_ms: default_list_timeout_ms(),
            detail_timeout_ms: default_detail_timeout_ms(),
            poll_interval_secs: default_poll_interval_secs(),
            detail_limit: default_detail_limit(),
        }
    }
}

impl LeaderboardConfig {
    /// The configured service URL, or `None` in degraded mode.
    pub fn service_url(&self) -> Option<&str> {
        self.backend_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/'))
            .filter(|u| !u.is_empty() && *u != DEFAULT_BACKEND_URL)
    }

    pub fn list_timeout(&self) -> Duration {
        Duration::from_millis(self.list_timeout_ms)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_millis(self.detail_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Retry settings for the contest list read.
#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    /// Retries after the first failure. Default: 3.
    #[serde(default = "default_max_retries")]
    pub max_retries: u8,
    /// Backoff unit; attempt `n` waits `n * base_delay_ms`. Default: 1000.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_retries() -> u8 {
    3
}
fn default_base_delay_ms() -> u64 {
    1_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}
