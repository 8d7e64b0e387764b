use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::RankedParticipant;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::feed::ContestFeed;

/// One refresh of a polled leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardSnapshot {
    /// 1-based refresh counter.
    pub round: u64,
    pub fetched_at: DateTime<Utc>,
    pub participants: Vec<RankedParticipant>,
}

/// Background refresh of one contest's leaderboard.
///
/// Fetches immediately, then once per interval, publishing every result on a
/// watch channel. Stops when the token is cancelled or the poller is dropped.
pub struct LeaderboardPoller {
    rx: watch::Receiver<Option<LeaderboardSnapshot>>,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl LeaderboardPoller {
    pub fn spawn(
        feed: Arc<ContestFeed>,
        contest_id: Uuid,
        limit: u32,
        interval: Duration,
        token: CancellationToken,
    ) -> Self {
        let (tx, rx) = watch::channel(None);
        let task_token = token.clone();
        let timeout = feed.leaderboard_config().detail_timeout();

        let handle = tokio::spawn(async move {
            info!(
                contest_id = %contest_id,
                interval_secs = interval.as_secs(),
                "Starting leaderboard polling"
            );
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut round = 0u64;

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let participants = tokio::select! {
                    _ = task_token.cancelled() => break,
                    p = feed.leaderboard(contest_id, limit, timeout) => p,
                };

                round += 1;
                debug!(contest_id = %contest_id, round, rows = participants.len(), "Leaderboard refreshed");
                let snapshot = LeaderboardSnapshot {
                    round,
                    fetched_at: Utc::now(),
                    participants,
                };
                if tx.send(Some(snapshot)).is_err() {
                    break;
                }
            }

            info!(contest_id = %contest_id, "Leaderboard polling stopped");
        });

        Self {
            rx,
            token,
            handle: Some(handle),
        }
    }

    /// A receiver that sees every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<LeaderboardSnapshot>> {
        self.rx.clone()
    }

    /// Cancel and wait for the task to finish.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for LeaderboardPoller {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
