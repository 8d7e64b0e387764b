use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::contest_status::{ContestStatus, resolve_status};
use crate::contest_window::{ContestWindow, WindowError};
use crate::countdown::{TimeRemaining, format_time_remaining, time_remaining};

/// Leaderboard size used for contest cards when the contest has no winner count.
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 15;

/// Row of the `contests` table, as read from storage.
///
/// Dates and status stay raw here; [`Contest::window`] is the validation step
/// that everything time-dependent goes through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub music_category: Option<String>,
    #[serde(default)]
    pub prize_per_winner: Option<f64>,
    #[serde(default)]
    pub prize_titles: Option<Vec<PrizeTitle>>,
    #[serde(default)]
    pub num_winners: Option<u32>,
    #[serde(default)]
    pub total_prize: Option<f64>,
    #[serde(default)]
    pub guidelines: Option<String>,
    #[serde(default)]
    pub rules: Option<String>,
    #[serde(default)]
    pub hashtags: Option<Vec<String>>,
    #[serde(default)]
    pub submission_deadline: Option<String>,
    #[serde(default)]
    pub max_participants: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTitle {
    pub rank: u32,
    pub title: String,
}

/// Whether winners receive money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrizeTier {
    Monetary,
    NonMonetary,
}

fn default_prize_titles() -> Vec<PrizeTitle> {
    [(1, "Winner"), (2, "Runner-up"), (3, "Third Place")]
        .into_iter()
        .map(|(rank, title)| PrizeTitle {
            rank,
            title: title.to_string(),
        })
        .collect()
}

impl Contest {
    /// Validate the raw dates into a window.
    pub fn window(&self) -> Result<ContestWindow, WindowError> {
        ContestWindow::parse(self.start_date.as_deref(), self.end_date.as_deref())
    }

    /// The stored status flag, if present and recognized.
    pub fn stored_status(&self) -> Option<ContestStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }

    /// Status to display at `now`.
    ///
    /// Archived rows stay archived. Rows with no stored status or an unreadable
    /// window are shown as `draft`. An unrecognized stored value carries no
    /// override, so only the window decides.
    pub fn calculated_status(&self, now: DateTime<Utc>) -> ContestStatus {
        let raw = self.status.as_deref().map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return ContestStatus::Draft;
        }
        let stored = raw.parse().unwrap_or_else(|_| {
            debug!(contest_id = %self.id, status = raw, "Unrecognized stored status, resolving by dates");
            ContestStatus::Active
        });
        if stored == ContestStatus::Archived {
            return ContestStatus::Archived;
        }
        match self.window() {
            Ok(window) => resolve_status(&window, stored, now),
            Err(e) => {
                debug!(contest_id = %self.id, error = %e, "Invalid contest window, treating as draft");
                ContestStatus::Draft
            }
        }
    }

    /// Countdown to the end of the contest. `None` when ended or the window is invalid.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<TimeRemaining> {
        self.window().ok().and_then(|w| time_remaining(&w, now))
    }

    /// Card text such as `3d 4h left`. Falls back to `Ended` or `Not started`
    /// only when there is no remaining time to show.
    pub fn time_left_label(&self, now: DateTime<Utc>) -> String {
        match self.time_remaining(now) {
            Some(left) => format!("{} left", format_time_remaining(&left)),
            None if self.calculated_status(now).is_closed() => "Ended".to_string(),
            None => "Not started".to_string(),
        }
    }

    /// Payout per winner: an even split of the pool when both the pool and
    /// winner count are known, otherwise the stored amount.
    pub fn prize_per_winner(&self) -> u64 {
        match (self.total_prize, self.num_winners) {
            (Some(total), Some(n)) if total > 0.0 && n > 0 => (total / n as f64).floor() as u64,
            _ => self
                .prize_per_winner
                .filter(|p| *p > 0.0)
                .map(|p| p.floor() as u64)
                .unwrap_or(0),
        }
    }

    pub fn prize_tier(&self) -> PrizeTier {
        if self.prize_per_winner.is_some() {
            PrizeTier::Monetary
        } else {
            PrizeTier::NonMonetary
        }
    }

    pub fn prize_titles(&self) -> Vec<PrizeTitle> {
        match &self.prize_titles {
            Some(titles) if !titles.is_empty() => titles.clone(),
            _ => default_prize_titles(),
        }
    }

    /// How many leaderboard rows a contest card shows.
    pub fn leaderboard_limit(&self) -> u32 {
        self.num_winners
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
    }

    /// Case-insensitive music category match. `All` matches every contest.
    pub fn in_category(&self, category: &str) -> bool {
        if category.eq_ignore_ascii_case("all") {
            return true;
        }
        self.music_category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(category))
    }
}
