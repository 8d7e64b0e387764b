use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated `[start, end)` window of a contest.
///
/// The only way to obtain one is through [`ContestWindow::new`] or
/// [`ContestWindow::parse`], so holding a window means both bounds exist,
/// parsed, and are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Reasons a contest row cannot be turned into a [`ContestWindow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// A bound is absent or blank.
    Missing(&'static str),
    /// A bound is present but not a timestamp.
    Unparseable { field: &'static str, value: String },
    /// The window closes before it opens.
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "contest {field} is missing"),
            Self::Unparseable { field, value } => {
                write!(f, "contest {field} '{value}' is not a valid timestamp")
            }
            Self::EndBeforeStart { start, end } => {
                write!(f, "contest ends ({end}) before it starts ({start})")
            }
        }
    }
}

impl std::error::Error for WindowError {}

impl ContestWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if end < start {
            return Err(WindowError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build a window from the raw `start_date` / `end_date` columns.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, WindowError> {
        let start = parse_bound("start_date", start)?;
        let end = parse_bound("end_date", end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

fn parse_bound(field: &'static str, raw: Option<&str>) -> Result<DateTime<Utc>, WindowError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return Err(WindowError::Missing(field));
    };
    parse_timestamp(raw).ok_or_else(|| WindowError::Unparseable {
        field,
        value: raw.to_string(),
    })
}

/// Parse a storage timestamp.
///
/// Accepts RFC 3339, Postgres `timestamptz` text (`2025-03-14 12:00:00+00`),
/// offset-less timestamps, and bare dates. Values without an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
