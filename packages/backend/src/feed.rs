use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::config::{LeaderboardConfig, RetryConfig};
use common::leaderboard::rank_entries;
use common::retry::{RetryBudget, RetryDecision};
use common::{
    Contest, ContestLink, ContestStatus, JoinEligibility, Profile, RankedParticipant, Submission,
    SubmissionTotals, TikTokProfile, TimeRemaining, join_eligibility,
};
use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{BackendError, Result};
use crate::leaderboard::{HttpLeaderboard, LeaderboardApi};
use crate::storage::{ContestStore, SupabaseStore};

/// A live contest as shown on the contest list.
#[derive(Debug, Clone, Serialize)]
pub struct ContestCard {
    pub contest: Contest,
    pub status: ContestStatus,
    pub time_left: String,
    pub prize_per_winner: u64,
    pub top_participants: Vec<RankedParticipant>,
}

/// Everything the public leaderboard page renders.
#[derive(Debug, Clone, Serialize)]
pub struct ContestDetail {
    pub contest: Contest,
    pub status: ContestStatus,
    pub time_remaining: Option<TimeRemaining>,
    pub starts_in: Option<TimeRemaining>,
    pub participants: Vec<RankedParticipant>,
}

/// One of a user's contest entries with its contest resolved.
#[derive(Debug, Clone, Serialize)]
pub struct UserEntry {
    pub link: ContestLink,
    pub contest: Option<Contest>,
    pub status: Option<ContestStatus>,
}

/// What the profile view shows for a user.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileOverview {
    pub profile: Option<Profile>,
    pub tiktok: Option<TikTokProfile>,
    pub joined: Vec<(Contest, ContestStatus)>,
    pub submissions: Vec<Submission>,
    pub totals: SubmissionTotals,
}

/// Single read path shared by every contest view: fetch rows, derive status,
/// attach the leaderboard.
pub struct ContestFeed {
    store: Arc<dyn ContestStore>,
    leaderboard: Option<Arc<dyn LeaderboardApi>>,
    leaderboard_config: LeaderboardConfig,
    retry_config: RetryConfig,
}

impl ContestFeed {
    pub fn new(
        store: Arc<dyn ContestStore>,
        leaderboard: Option<Arc<dyn LeaderboardApi>>,
        leaderboard_config: LeaderboardConfig,
        retry_config: RetryConfig,
    ) -> Self {
        Self {
            store,
            leaderboard,
            leaderboard_config,
            retry_config,
        }
    }

    /// Build the HTTP-backed feed. No leaderboard client is created in degraded mode.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn ContestStore> = Arc::new(SupabaseStore::new(&config.storage)?);
        let leaderboard = match config.leaderboard.service_url() {
            Some(url) => {
                info!(url, "Leaderboard service configured");
                Some(Arc::new(HttpLeaderboard::new(url)?) as Arc<dyn LeaderboardApi>)
            }
            None => {
                warn!("Leaderboard service not configured, leaderboards will be empty");
                None
            }
        };
        Ok(Self::new(
            store,
            leaderboard,
            config.leaderboard.clone(),
            config.retry.clone(),
        ))
    }

    pub fn leaderboard_config(&self) -> &LeaderboardConfig {
        &self.leaderboard_config
    }

    /// Contests that are live at `now`, newest first, each with its top entries.
    pub async fn active_contests(
        &self,
        now: DateTime<Utc>,
        category: Option<&str>,
    ) -> Result<Vec<ContestCard>> {
        let contests = self.list_with_retry().await?;

        let live: Vec<Contest> = contests
            .into_iter()
            .filter(|c| c.calculated_status(now) == ContestStatus::Active)
            .filter(|c| category.is_none_or(|cat| c.in_category(cat)))
            .collect();

        let timeout = self.leaderboard_config.list_timeout();
        let boards = join_all(
            live.iter()
                .map(|c| self.leaderboard(c.id, c.leaderboard_limit(), timeout)),
        )
        .await;

        Ok(live
            .into_iter()
            .zip(boards)
            .map(|(contest, top_participants)| ContestCard {
                status: ContestStatus::Active,
                time_left: contest.time_left_label(now),
                prize_per_winner: contest.prize_per_winner(),
                top_participants,
                contest,
            })
            .collect())
    }

    /// Read the listed contests, retrying transient failures with linear backoff.
    ///
    /// Only the final outcome is reported at error level; intermediate failures
    /// are logged as retries.
    async fn list_with_retry(&self) -> Result<Vec<Contest>> {
        let mut budget = RetryBudget::new(
            self.retry_config.max_retries,
            self.retry_config.base_delay(),
        );

        loop {
            let err = match self.store.list_contests(ContestStatus::LISTED).await {
                Ok(contests) => return Ok(contests),
                Err(e) => e,
            };

            if !err.is_transient() {
                error!(error = %err, "Failed to load contests");
                return Err(err);
            }

            match budget.record_failure(&err.to_string()) {
                RetryDecision::Retry { attempt, delay } => {
                    warn!(
                        attempt,
                        max_retries = self.retry_config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying contest list fetch"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Exhausted { history } => {
                    let outage_ms = match (history.first(), history.last()) {
                        (Some(first), Some(last)) => {
                            (last.timestamp - first.timestamp).num_milliseconds()
                        }
                        _ => 0,
                    };
                    error!(
                        attempts = budget.failures(),
                        outage_ms,
                        error = %err,
                        "Unable to reach storage, giving up on contest list"
                    );
                    return Err(err);
                }
            }
        }
    }

    /// The public leaderboard page for one contest.
    pub async fn contest_detail(&self, id: Uuid, now: DateTime<Utc>) -> Result<ContestDetail> {
        let contest = self
            .store
            .find_contest(id)
            .await?
            .ok_or_else(|| BackendError::NotFound(format!("Contest {id}")))?;

        let participants = self
            .leaderboard(
                id,
                self.leaderboard_config.detail_limit,
                self.leaderboard_config.detail_timeout(),
            )
            .await;

        let window = contest.window().ok();
        Ok(ContestDetail {
            status: contest.calculated_status(now),
            time_remaining: window.and_then(|w| common::countdown::time_remaining(&w, now)),
            starts_in: window.and_then(|w| common::countdown::time_until_start(&w, now)),
            participants,
            contest,
        })
    }

    /// Ranked entries for a contest. Never fails: an unreachable or
    /// unconfigured service yields an empty board.
    pub async fn leaderboard(
        &self,
        contest_id: Uuid,
        limit: u32,
        timeout: Duration,
    ) -> Vec<RankedParticipant> {
        let Some(api) = &self.leaderboard else {
            warn!(contest_id = %contest_id, "Leaderboard service not configured, skipping leaderboard fetch");
            return Vec::new();
        };

        match api.fetch(contest_id, limit, timeout).await {
            Ok(entries) => rank_entries(entries),
            Err(BackendError::Timeout(after)) => {
                warn!(contest_id = %contest_id, timeout_ms = after.as_millis() as u64, "Leaderboard request timeout");
                Vec::new()
            }
            Err(BackendError::Status { status, .. }) => {
                warn!(contest_id = %contest_id, status, "Leaderboard API returned an error status");
                Vec::new()
            }
            Err(e) => {
                warn!(contest_id = %contest_id, error = %e, "Network error fetching leaderboard");
                Vec::new()
            }
        }
    }

    /// A user's contest entries keyed by contest.
    pub async fn user_submissions(&self, user_id: Uuid) -> Result<HashMap<Uuid, ContestLink>> {
        let links = self.store.user_submissions(user_id).await?;
        Ok(links
            .into_iter()
            .filter_map(|link| link.contest_id.map(|id| (id, link)))
            .collect())
    }

    /// A user's contest entries, each with its contest and current status.
    pub async fn user_entries(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Vec<UserEntry>> {
        let links = self.store.user_submissions(user_id).await?;
        let lookups = links.iter().map(|link| async move {
            match link.contest_id {
                Some(id) => self.store.find_contest(id).await,
                None => Ok(None),
            }
        });
        let contests = join_all(lookups).await;

        links
            .into_iter()
            .zip(contests)
            .map(|(link, contest)| {
                let contest = contest?;
                let status = contest.as_ref().map(|c| c.calculated_status(now));
                Ok(UserEntry {
                    link,
                    contest,
                    status,
                })
            })
            .collect()
    }

    /// Profile, linked TikTok account, joined contests, and submissions of a user.
    pub async fn profile_overview(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ProfileOverview> {
        let (profile, joined, submissions) = tokio::try_join!(
            self.store.profile(user_id),
            self.store.joined_contests(user_id),
            self.store.profile_submissions(user_id),
        )?;
        let tiktok = self.tiktok_profile(user_id).await;

        let joined = joined
            .into_iter()
            .filter_map(|p| p.contest)
            .map(|c| {
                let status = c.calculated_status(now);
                (c, status)
            })
            .collect();

        Ok(ProfileOverview {
            profile,
            tiktok,
            joined,
            totals: SubmissionTotals::of(&submissions),
            submissions,
        })
    }

    /// Linked TikTok account, or `None` when absent or the lookup fails.
    pub async fn tiktok_profile(&self, user_id: Uuid) -> Option<TikTokProfile> {
        match self.store.tiktok_profile(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Error checking TikTok connection");
                None
            }
        }
    }

    pub async fn tiktok_connected(&self, user_id: Uuid) -> bool {
        self.tiktok_profile(user_id).await.is_some()
    }

    /// Whether `viewer` may join `contest` at `now`.
    ///
    /// Lookup failures count as "not connected" and "not yet joined".
    pub async fn eligibility(
        &self,
        contest: &Contest,
        viewer: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> JoinEligibility {
        let status = contest.calculated_status(now);
        let Some(user_id) = viewer else {
            return join_eligibility(status, false, false, false);
        };
        if status.is_closed() {
            return JoinEligibility::Closed;
        }

        let (connected, submission) = tokio::join!(
            self.tiktok_connected(user_id),
            self.store.user_submission(contest.id, user_id),
        );
        let already_joined = match submission {
            Ok(link) => link.is_some(),
            Err(e) => {
                warn!(contest_id = %contest.id, user_id = %user_id, error = %e, "Error fetching user submission");
                false
            }
        };
        join_eligibility(status, true, connected, already_joined)
    }
}
