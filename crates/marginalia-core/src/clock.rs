//! Time source for comment timestamps and rate-limit windows.

use chrono::{DateTime, Utc};

/// Where handlers and the rate limiter read "now" from.
///
/// Comment events carry `createdAt`/`editedAt`/`deletedAt` from this clock,
/// never from `Utc::now()` directly, so a test can pin every timestamp a
/// request produces.
pub trait Clock: Send + Sync {
    /// The instant stamped on the event being written.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, used by the server binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
