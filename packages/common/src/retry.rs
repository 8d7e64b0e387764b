use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single retry attempt record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryAttempt {
    /// 1-based attempt number.
    pub attempt: u8,
    /// Error message from the failed attempt.
    pub error: String,
    /// When this attempt occurred.
    pub timestamp: DateTime<Utc>,
}

impl RetryAttempt {
    pub fn new(attempt: u8, error: impl Into<String>) -> Self {
        Self {
            attempt,
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Result of recording a failure in a [`RetryBudget`].
#[derive(Debug, Clone)]
pub enum RetryDecision {
    Retry { attempt: u8, delay: Duration },
    Exhausted { history: Vec<RetryAttempt> },
}

/// Retry bookkeeping for one logical operation.
///
/// Failures are recorded in order; the budget allows `max_retries` further
/// attempts after the first, waiting `base_delay * attempt` before each.
#[derive(Debug, Clone)]
pub struct RetryBudget {
    max_retries: u8,
    base_delay: Duration,
    history: Vec<RetryAttempt>,
}

impl RetryBudget {
    pub fn new(max_retries: u8, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            history: Vec::new(),
        }
    }

    /// Record a failed attempt and decide whether to try again.
    pub fn record_failure(&mut self, error: &str) -> RetryDecision {
        let attempt = self.history.len() as u8 + 1;
        self.history.push(RetryAttempt::new(attempt, error));

        if attempt <= self.max_retries {
            RetryDecision::Retry {
                attempt,
                delay: calculate_linear_backoff(attempt, self.base_delay),
            }
        } else {
            RetryDecision::Exhausted {
                history: self.history.clone(),
            }
        }
    }

    /// Number of failures recorded so far.
    pub fn failures(&self) -> usize {
        self.history.len()
    }
}

/// Linear backoff: `base * attempt`. Attempt 0 waits nothing.
pub fn calculate_linear_backoff(attempt: u8, base: Duration) -> Duration {
    base.saturating_mul(attempt as u32)
}
