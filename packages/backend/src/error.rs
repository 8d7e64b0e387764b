use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Http(reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0} not found")]
    NotFound(String),
}

impl BackendError {
    /// Failures worth retrying: the request never got a usable answer.
    ///
    /// Connection failures, timeouts, and gateway/overload statuses are
    /// transient. Rejections and bad payloads are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request() || e.is_body(),
            Self::Status { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            Self::Config(_) | Self::Decode(_) | Self::NotFound(_) => false,
        }
    }

    /// Map a send error, turning reqwest's timeout into [`BackendError::Timeout`].
    pub(crate) fn from_send(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Http(err)
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::Http(e)
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;
