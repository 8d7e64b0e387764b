pub mod config;
pub mod error;
pub mod feed;
pub mod leaderboard;
pub mod poller;
pub mod storage;

pub use config::AppConfig;
pub use error::{BackendError, Result};
pub use feed::{ContestCard, ContestDetail, ContestFeed, ProfileOverview, UserEntry};
pub use leaderboard::{HttpLeaderboard, LeaderboardApi};
pub use poller::{LeaderboardPoller, LeaderboardSnapshot};
pub use storage::{ContestStore, SupabaseStore, TableQuery};
