use serde::Serialize;

use crate::contest_status::ContestStatus;

/// Outcome of asking whether a user may enter a contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinEligibility {
    Eligible,
    /// Contest has ended or was archived.
    Closed,
    SignInRequired,
    AlreadyJoined,
    TikTokRequired,
}

impl JoinEligibility {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Eligible => "You can join this contest",
            Self::Closed => "This contest has ended and is no longer accepting participants.",
            Self::SignInRequired => "Sign in to join this contest",
            Self::AlreadyJoined => "You have already submitted an entry",
            Self::TikTokRequired => "Connect your TikTok account to join",
        }
    }
}

/// Decide whether a user may enter a contest in its current state.
///
/// Checks run in the order the join flow presents them: a closed contest is
/// reported even to signed-out visitors.
pub fn join_eligibility(
    status: ContestStatus,
    signed_in: bool,
    tiktok_connected: bool,
    already_joined: bool,
) -> JoinEligibility {
    if status.is_closed() {
        return JoinEligibility::Closed;
    }
    if !signed_in {
        return JoinEligibility::SignInRequired;
    }
    if already_joined {
        return JoinEligibility::AlreadyJoined;
    }
    if !tiktok_connected {
        return JoinEligibility::TikTokRequired;
    }
    JoinEligibility::Eligible
}
