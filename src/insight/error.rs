use std::time::Duration;
use thiserror::Error;

/// Failure of a single insight request
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("rate limited by insight service (status 429): {body}")]
    RateLimited { body: String },

    #[error("insight service error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("insight service rejected request with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response from insight service: {0}")]
    InvalidResponse(String),

    #[error("insight service is not configured: {0}")]
    NotConfigured(String),

    #[error("gave up after {attempts} attempts over {elapsed:?}: {last}")]
    Exhausted {
        attempts: u32,
        elapsed: Duration,
        last: Box<InsightError>,
    },
}

impl InsightError {
    /// Map a non-success HTTP status to its error kind
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => Self::RateLimited { body },
            500..=599 => Self::Server { status, body },
            _ => Self::Api { status, body },
        }
    }

    /// Rate limits and server-side failures are worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Server { .. })
    }
}
