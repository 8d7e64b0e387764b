use std::time::Duration;

use async_trait::async_trait;
use common::leaderboard::{LeaderboardEntry, LeaderboardEnvelope};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use uuid::Uuid;

use crate::error::{BackendError, Result};

/// The external service that ranks contest entries.
#[async_trait]
pub trait LeaderboardApi: Send + Sync {
    /// Fetch at most `limit` pre-ranked entries, giving up after `timeout`.
    async fn fetch(
        &self,
        contest_id: Uuid,
        limit: u32,
        timeout: Duration,
    ) -> Result<Vec<LeaderboardEntry>>;
}

/// [`LeaderboardApi`] over `GET {base}/api/v1/contests/{id}/leaderboard`.
#[derive(Clone)]
pub struct HttpLeaderboard {
    http: reqwest::Client,
    base_url: String,
}

impl HttpLeaderboard {
    pub fn new(base_url: &str) -> Result<Self> {
        static APP_USER_AGENT: &str =
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn leaderboard_url(&self, contest_id: Uuid) -> String {
        format!(
            "{}/api/v1/contests/{}/leaderboard",
            self.base_url, contest_id
        )
    }
}

#[async_trait]
impl LeaderboardApi for HttpLeaderboard {
    async fn fetch(
        &self,
        contest_id: Uuid,
        limit: u32,
        timeout: Duration,
    ) -> Result<Vec<LeaderboardEntry>> {
        let res = self
            .http
            .get(self.leaderboard_url(contest_id))
            .query(&[("limit", limit)])
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| BackendError::from_send(e, timeout))?;

        let status = res.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                service: "leaderboard",
                status: status.as_u16(),
                body: res.text().await.unwrap_or_default(),
            });
        }

        let body = res
            .text()
            .await
            .map_err(|e| BackendError::from_send(e, timeout))?;
        let envelope: LeaderboardEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.into_entries())
    }
}
