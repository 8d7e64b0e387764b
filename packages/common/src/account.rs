use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contest::Contest;
use crate::leaderboard::lenient_count;

/// Row of `contest_links`: a video a user linked, optionally as a contest entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestLink {
    pub id: Uuid,
    #[serde(default)]
    pub contest_id: Option<Uuid>,
    pub created_by: Uuid,
    #[serde(default)]
    pub is_contest_submission: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Row of `tiktok_profiles`. Its presence means the user linked an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TikTokProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub follower_count: Option<u64>,
}

/// Row of `profiles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Profile {
    pub fn is_organizer(&self) -> bool {
        matches!(self.role.as_deref(), Some("organizer" | "admin"))
    }
}

/// Row of `contest_participants` with its contest embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestParticipation {
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "contests")]
    pub contest: Option<Contest>,
}

/// Name of the contest a [`Submission`] is embedded with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionContest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Row of `submissions`, read with its contest's name embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    #[serde(default)]
    pub contest_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub views: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comments: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub shares: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "contests")]
    pub contest: Option<SubmissionContest>,
}

impl Submission {
    pub fn contest_name(&self) -> &str {
        self.contest
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown Contest")
    }
}

/// Counters shown above a user's submission list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionTotals {
    pub count: usize,
    pub views: u64,
}

impl SubmissionTotals {
    pub fn of(submissions: &[Submission]) -> Self {
        Self {
            count: submissions.len(),
            views: submissions
                .iter()
                .map(|s| s.views.unwrap_or(0))
                .fold(0, u64::saturating_add),
        }
    }
}
