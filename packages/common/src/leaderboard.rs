use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `GET /api/v1/contests/{id}/leaderboard`.
///
/// The service wraps its payload in `{ "data": { "leaderboard": [...] } }`.
/// Any level may be missing, which reads as an empty board.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardEnvelope {
    #[serde(default)]
    pub data: Option<LeaderboardData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardData {
    #[serde(default)]
    pub leaderboard: Option<Vec<LeaderboardEntry>>,
}

impl LeaderboardEnvelope {
    pub fn into_entries(self) -> Vec<LeaderboardEntry> {
        self.data.and_then(|d| d.leaderboard).unwrap_or_default()
    }
}

/// One pre-ranked row as sent by the leaderboard service.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub views: Option<u64>,
    #[serde(default, rename = "previousRank", deserialize_with = "lenient_rank")]
    pub previous_rank: Option<u32>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub video_title: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comments: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub shares: Option<u64>,
    #[serde(default)]
    pub submission_date: Option<String>,
    #[serde(default)]
    pub tiktok_username: Option<String>,
    #[serde(default)]
    pub tiktok_display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Int(u64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl RawCount {
    fn into_count(self) -> Option<u64> {
        let float = match self {
            Self::Int(n) => return Some(n),
            Self::Float(f) => f,
            Self::Text(t) => {
                let t = t.trim();
                if let Ok(n) = t.parse::<u64>() {
                    return Some(n);
                }
                t.parse::<f64>().ok()?
            }
            Self::Other(_) => return None,
        };
        (float.is_finite() && float >= 0.0).then(|| float.floor() as u64)
    }
}

/// Counts arrive as integers, floats, or numeric strings. Anything else reads
/// as missing instead of rejecting the whole board.
pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(RawCount::deserialize(deserializer)?.into_count())
}

fn lenient_rank<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_count(deserializer)?.and_then(|n| u32::try_from(n).ok()))
}

/// Leaderboard row with defaults filled in and a rank attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedParticipant {
    pub rank: u32,
    pub username: String,
    pub full_name: String,
    pub views: u64,
    pub points: u64,
    pub previous_rank: u32,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub video_id: Option<String>,
    pub video_title: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail: Option<String>,
    pub tiktok_username: Option<String>,
    pub tiktok_display_name: Option<String>,
}

/// Change in position since the previous ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RankMovement {
    Up(u32),
    Down(u32),
    Same,
}

impl RankedParticipant {
    pub fn movement(&self) -> RankMovement {
        if self.previous_rank > self.rank {
            RankMovement::Up(self.previous_rank - self.rank)
        } else if self.previous_rank < self.rank {
            RankMovement::Down(self.rank - self.previous_rank)
        } else {
            RankMovement::Same
        }
    }

    /// Handle to show for the entry's video, preferring the TikTok account name.
    pub fn display_handle(&self) -> &str {
        self.tiktok_username.as_deref().unwrap_or(&self.username)
    }
}

/// Attach ranks in service order and fill missing fields.
pub fn rank_entries(entries: Vec<LeaderboardEntry>) -> Vec<RankedParticipant> {
    entries
        .into_iter()
        .zip(1u32..)
        .map(|(entry, rank)| {
            let username = entry
                .username
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| "Unknown".to_string());
            let full_name = entry
                .full_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| username.clone());
            let views = entry.views.unwrap_or(0);
            RankedParticipant {
                rank,
                username,
                full_name,
                views,
                points: views,
                previous_rank: entry.previous_rank.filter(|r| *r > 0).unwrap_or(rank),
                likes: entry.likes.unwrap_or(0),
                comments: entry.comments.unwrap_or(0),
                shares: entry.shares.unwrap_or(0),
                video_id: entry.video_id,
                video_title: entry.video_title,
                video_url: entry.video_url,
                thumbnail: entry.thumbnail,
                tiktok_username: entry.tiktok_username,
                tiktok_display_name: entry.tiktok_display_name,
            }
        })
        .collect()
}
