//! Wall-clock access and the night window.
//!
//! Sleep is a pure function of the clock hour against the configured
//! night window; the stored `sleeping` flag is only a cache refreshed by
//! scheduler passes. The clock is injected so the window logic is
//! testable at fixed hours.

use chrono::{DateTime, Timelike, Utc};
use parking_lot::Mutex;

use crate::config::NightConfig;

/// Source of the current time. The implementation decides the timezone
/// the night window is interpreted in; [`SystemClock`] uses UTC.
pub trait Clock: Send + Sync {
    /// The current moment.
    fn now(&self) -> DateTime<Utc>;

    /// The current hour (0-23), derived from [`Clock::now`].
    fn hour(&self) -> u32 {
        self.now().hour()
    }
}

/// The real wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a settable moment. Meant for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    at: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Pin the clock to `at`.
    #[must_use]
    pub fn pinned(at: DateTime<Utc>) -> Self {
        Self { at: Mutex::new(at) }
    }

    /// Move the pinned moment.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.at.lock() = at;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.at.lock()
    }
}

/// Whether `hour` falls inside the night window `[start, end)`.
///
/// A window with `start > end` wraps past midnight; equal bounds mean the
/// night never ends.
#[must_use]
pub fn is_night_hour(hour: u32, night: &NightConfig) -> bool {
    if night.start_hour < night.end_hour {
        (night.start_hour..night.end_hour).contains(&hour)
    } else {
        hour >= night.start_hour || hour < night.end_hour
    }
}
