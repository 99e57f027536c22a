//! # Client Errors
//!
//! Error types shared by the orchestration layer and the API client.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend returned an error response.
    #[error("api error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the backend.
        message: String,
    },

    /// Failed to deserialize a response body.
    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    /// A scheduled request did not settle within its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The scheduler's pending queue is at capacity.
    #[error("pending queue is full (capacity {0})")]
    QueueFull(usize),

    /// The scheduler dropped the request before it could settle.
    #[error("request was dropped before completion")]
    Dropped,

    /// A fetch shared with other waiters failed.
    ///
    /// Produced when several callers join a single in-flight cache fetch
    /// and that fetch fails: every waiter observes the same underlying error.
    #[error("shared fetch failed: {0}")]
    Shared(Arc<ClientError>),
}

impl ClientError {
    /// Returns true if this error is an application-level rate limit (HTTP 429).
    ///
    /// A 429 is a *successful* transport exchange that the backend answered
    /// with "too many requests"; the scheduler does not interpret it, callers
    /// decide whether to keep previously-known state instead of failing.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ClientError::Api { status, .. } => *status == 429,
            ClientError::Shared(inner) => inner.is_rate_limited(),
            _ => false,
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
