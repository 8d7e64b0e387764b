pub mod account;
pub mod config;
pub mod contest;
pub mod contest_status;
pub mod contest_window;
pub mod countdown;
pub mod eligibility;
pub mod leaderboard;
pub mod retry;

pub use account::{
    ContestLink, ContestParticipation, Profile, Submission, SubmissionContest, SubmissionTotals,
    TikTokProfile,
};
pub use contest::{Contest, PrizeTier, PrizeTitle};
pub use contest_status::{ContestStatus, ParseStatusError, resolve_status};
pub use contest_window::{ContestWindow, WindowError};
pub use countdown::{TimeRemaining, format_count, format_time_remaining};
pub use eligibility::{JoinEligibility, join_eligibility};
pub use leaderboard::{RankedParticipant, RankMovement};
