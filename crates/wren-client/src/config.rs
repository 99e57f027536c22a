//! # Configuration
//!
//! Tunables for the request orchestration layer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the orchestration layer.
///
/// The defaults match the production tuning of the Wren web client:
/// a 2 second gap between outbound requests, a 60 second freshness
/// window for status probes, and batches of 3 probes with 3 seconds
/// of idle time between batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Minimum gap between the *starts* of two scheduled requests, in ms.
    #[serde(default = "default_min_request_gap_ms")]
    pub min_request_gap_ms: u64,

    /// Deadline for a single scheduled request, in ms. `None` disables
    /// the deadline and restores the original unbounded-wait behavior.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: Option<u64>,

    /// Maximum number of requests waiting in the scheduler queue.
    /// Enqueueing beyond this rejects fast instead of growing forever.
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,

    /// Freshness window for cached status probes, in ms.
    #[serde(default = "default_status_ttl_ms")]
    pub status_ttl_ms: u64,

    /// Number of status probes dispatched concurrently per batch chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Idle time between batch chunks, in ms.
    #[serde(default = "default_inter_chunk_delay_ms")]
    pub inter_chunk_delay_ms: u64,
}

fn default_min_request_gap_ms() -> u64 {
    2_000
}

fn default_request_timeout_ms() -> Option<u64> {
    Some(30_000)
}

fn default_max_pending() -> usize {
    256
}

fn default_status_ttl_ms() -> u64 {
    60_000
}

fn default_chunk_size() -> usize {
    3
}

fn default_inter_chunk_delay_ms() -> u64 {
    3_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_request_gap_ms: default_min_request_gap_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            max_pending: default_max_pending(),
            status_ttl_ms: default_status_ttl_ms(),
            chunk_size: default_chunk_size(),
            inter_chunk_delay_ms: default_inter_chunk_delay_ms(),
        }
    }
}

impl Config {
    /// Minimum gap between request starts.
    #[must_use]
    pub fn min_request_gap(&self) -> Duration {
        Duration::from_millis(self.min_request_gap_ms)
    }

    /// Per-request deadline, if any.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Freshness window for status probes.
    #[must_use]
    pub fn status_ttl(&self) -> Duration {
        Duration::from_millis(self.status_ttl_ms)
    }

    /// Idle time between batch chunks.
    #[must_use]
    pub fn inter_chunk_delay(&self) -> Duration {
        Duration::from_millis(self.inter_chunk_delay_ms)
    }
}
