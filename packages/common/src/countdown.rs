use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::contest_window::ContestWindow;

/// A non-negative duration broken down for countdown displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRemaining {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    /// Whole seconds left in total.
    pub total_seconds: u64,
}

impl TimeRemaining {
    /// Break down a delta. Negative deltas clamp to zero.
    pub fn from_delta(delta: TimeDelta) -> Self {
        let total_seconds = delta.num_seconds().max(0) as u64;
        Self {
            days: total_seconds / 86_400,
            hours: (total_seconds % 86_400) / 3_600,
            minutes: (total_seconds % 3_600) / 60,
            seconds: total_seconds % 60,
            total_seconds,
        }
    }
}

/// Time left until the window closes, or `None` once it has.
pub fn time_remaining(window: &ContestWindow, now: DateTime<Utc>) -> Option<TimeRemaining> {
    if now >= window.end() {
        return None;
    }
    Some(TimeRemaining::from_delta(window.end() - now))
}

/// Time left until the window opens, or `None` once it has.
pub fn time_until_start(window: &ContestWindow, now: DateTime<Utc>) -> Option<TimeRemaining> {
    if now >= window.start() {
        return None;
    }
    Some(TimeRemaining::from_delta(window.start() - now))
}

/// Render the two most significant units, starting at the largest non-zero one.
///
/// `2d 5h`, `1h 30m`, `4m 10s`, `42s`.
pub fn format_time_remaining(remaining: &TimeRemaining) -> String {
    if remaining.days > 0 {
        format!("{}d {}h", remaining.days, remaining.hours)
    } else if remaining.hours > 0 {
        format!("{}h {}m", remaining.hours, remaining.minutes)
    } else if remaining.minutes > 0 {
        format!("{}m {}s", remaining.minutes, remaining.seconds)
    } else {
        format!("{}s", remaining.seconds)
    }
}

/// Compact view/point counts: `1.2M`, `3.4K`, `999`.
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
