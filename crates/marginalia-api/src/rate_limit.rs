//! Fixed-window rate limiting keyed by client identifier.
//!
//! Counters live in process memory only. They are best-effort: separate
//! server instances do not share them and a restart resets them.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;

/// Number of tracked clients above which stale windows are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

/// Errors raised while building a rate limit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateLimitError {
    /// The window string could not be parsed.
    #[error("invalid rate limit window {0:?}: {1}")]
    InvalidWindow(String, String),

    /// The window must be at least one millisecond long.
    #[error("rate limit window must be at least 1ms")]
    EmptyWindow,

    /// At least one request per window must be allowed.
    #[error("rate limit must allow at least one request")]
    NoRequests,
}

/// A request budget per fixed time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed per window.
    pub requests: u32,
    /// Window length.
    pub window: Duration,
}

impl RateLimit {
    /// Creates a rate limit.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitError` if `requests` is zero or `window` is shorter
    /// than a millisecond.
    pub fn new(requests: u32, window: Duration) -> Result<Self, RateLimitError> {
        if requests == 0 {
            return Err(RateLimitError::NoRequests);
        }
        if window.as_millis() == 0 {
            return Err(RateLimitError::EmptyWindow);
        }
        Ok(Self { requests, window })
    }

    /// Creates a rate limit from a window written as `"1 m"`, `"10 s"`,
    /// `"500 ms"` or `"1 h"`.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitError` if the window does not parse or the limit is
    /// degenerate.
    pub fn parse(requests: u32, window: &str) -> Result<Self, RateLimitError> {
        let compact: String = window.chars().filter(|c| !c.is_whitespace()).collect();
        let window = humantime::parse_duration(&compact)
            .map_err(|e| RateLimitError::InvalidWindow(window.to_owned(), e.to_string()))?;
        Self::new(requests, window)
    }

    fn window_millis(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request fits in the current window.
    Allowed {
        /// Requests left in the current window.
        remaining: u32,
    },
    /// The window's budget is spent.
    Limited {
        /// Time until the current window ends.
        retry_after: Duration,
    },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    index: i64,
    count: u32,
}

/// Fixed-window counter per client.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    limit: RateLimit,
    windows: DashMap<String, Window>,
    prune_threshold: usize,
    /// Window index of the last prune; stale entries are swept at most once
    /// per window.
    last_pruned: AtomicI64,
}

impl FixedWindowLimiter {
    /// Creates a limiter with no recorded traffic.
    #[must_use]
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            windows: DashMap::new(),
            prune_threshold: PRUNE_THRESHOLD,
            last_pruned: AtomicI64::new(i64::MIN),
        }
    }

    /// Returns the configured limit.
    #[must_use]
    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Counts a request from `client` at `now` and decides whether it may
    /// proceed. Limited requests are not counted.
    pub fn check(&self, client: &str, now: DateTime<Utc>) -> Decision {
        let window_ms = self.limit.window_millis();
        let now_ms = now.timestamp_millis();
        let index = now_ms.div_euclid(window_ms);

        if self.windows.len() > self.prune_threshold
            && self.last_pruned.swap(index, Ordering::Relaxed) != index
        {
            self.windows.retain(|_, w| w.index == index);
        }

        let mut entry = self
            .windows
            .entry(client.to_owned())
            .or_insert(Window { index, count: 0 });
        if entry.index != index {
            *entry = Window { index, count: 0 };
        }

        if entry.count >= self.limit.requests {
            let window_end = index.saturating_add(1).saturating_mul(window_ms);
            let wait_ms = u64::try_from(window_end - now_ms).unwrap_or(0);
            return Decision::Limited {
                retry_after: Duration::from_millis(wait_ms),
            };
        }

        entry.count += 1;
        Decision::Allowed {
            remaining: self.limit.requests - entry.count,
        }
    }
}
