use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::contest_window::ContestWindow;

/// Lifecycle state of a contest.
///
/// The same set of values is used for the flag stored on the contest row and
/// for the status derived from the contest window at read time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    /// Not open yet, or held back by the organizer.
    Draft,
    /// Accepting entries.
    Active,
    /// Window has closed.
    Ended,
    /// Removed from listings by the organizer. Terminal.
    Archived,
}

impl ContestStatus {
    /// All possible status values.
    pub const ALL: &'static [ContestStatus] =
        &[Self::Draft, Self::Active, Self::Ended, Self::Archived];

    /// Statuses the contest list reads from storage before deriving.
    pub const LISTED: &'static [ContestStatus] = &[Self::Active, Self::Draft];

    /// Returns the stored string representation (lowercase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Ended => "ended",
            Self::Archived => "archived",
        }
    }

    /// Returns true once the contest no longer takes entries.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Ended | Self::Archived)
    }

    /// Badge text shown next to a contest.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Starting Soon",
            Self::Active => "Live",
            Self::Ended => "Ended",
            Self::Archived => "Archived",
        }
    }

    /// Badge color name. Front-ends map this onto their own palette.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Draft => "yellow",
            Self::Active => "green",
            Self::Ended => "red",
            Self::Archived => "gray",
        }
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ContestStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    invalid: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid contest status '{}'. Valid values: {}",
            self.invalid,
            ContestStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for ContestStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "ended" => Ok(Self::Ended),
            "archived" => Ok(Self::Archived),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// Derive the display status of a contest at `now`.
///
/// `archived` is authoritative. Otherwise the window decides: at or past the
/// end the contest is `ended`, before the start it is `draft`. Inside the
/// window a stored `draft` or `ended` flag is an organizer override and is
/// kept; anything else is `active`.
pub fn resolve_status(
    window: &ContestWindow,
    stored: ContestStatus,
    now: DateTime<Utc>,
) -> ContestStatus {
    if stored == ContestStatus::Archived {
        return ContestStatus::Archived;
    }
    if now >= window.end() {
        return ContestStatus::Ended;
    }
    if now < window.start() {
        return ContestStatus::Draft;
    }
    match stored {
        ContestStatus::Draft => ContestStatus::Draft,
        ContestStatus::Ended => ContestStatus::Ended,
        _ => ContestStatus::Active,
    }
}
