//! Retry policy for rate-limited Zotero API requests.
//!
//! The Zotero API answers `429 Too Many Requests` or `503 Service Unavailable` when a client
//! should slow down, optionally with a `Retry-After` or `Backoff` header (seconds).

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;

pub const MAX_ATTEMPTS: u32 = 5;

/// Upper bound on a server-requested wait.
pub const MAX_SERVER_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPlan {
    /// 1-based number of the retry about to be made.
    pub attempt: u32,
    pub max_attempts: u32,
    pub backoff: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(RetryPlan),
    GiveUp { attempts: u32 },
}

/// Tracks retry state for a single logical request.
#[derive(Debug, Default)]
pub struct RetryState {
    retries: u32,
}

impl RetryState {
    pub fn new() -> Self {
        Self { retries: 0 }
    }

    /// Returns `None` when `status` is not retryable.
    pub fn plan_retry(&mut self, status: StatusCode, headers: &HeaderMap) -> Option<RetryDecision> {
        if !is_retryable_status(status) {
            return None;
        }

        let attempts = self.retries + 1;
        if attempts >= MAX_ATTEMPTS {
            return Some(RetryDecision::GiveUp { attempts });
        }

        let backoff = server_backoff(headers).unwrap_or_else(|| {
            Duration::from_secs(if self.retries == 0 {
                0
            } else {
                1u64 << (self.retries - 1)
            })
        });
        self.retries += 1;

        Some(RetryDecision::Retry(RetryPlan {
            attempt: self.retries,
            max_attempts: MAX_ATTEMPTS,
            backoff,
        }))
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
}

fn server_backoff(headers: &HeaderMap) -> Option<Duration> {
    ["Retry-After", "Backoff"].into_iter().find_map(|name| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs).min(MAX_SERVER_BACKOFF))
    })
}
