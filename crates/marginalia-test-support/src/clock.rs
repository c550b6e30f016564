//! Pinned clock for comment timestamps and rate-limit windows in tests.

use chrono::{DateTime, TimeZone, Utc};
use marginalia_core::clock::Clock;

/// Reports the same instant on every call, so event timestamps are exact and
/// every request of a test lands in the same rate-limit window.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Pins the clock to a UTC calendar time.
    ///
    /// # Panics
    ///
    /// Panics if the fields do not form a valid date and time.
    #[must_use]
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        let instant = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .single()
            .unwrap_or_else(|| {
                panic!("invalid fixed time {year}-{month}-{day} {hour}:{minute}:{second}")
            });
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
