//! Time source abstraction for real and manually controlled clocks.
//!
//! The alert scheduler never reads the system clock directly; it samples a
//! [`TimeSource`] so tests and the `--at` command-line option can pin the
//! current time. All scheduling arithmetic happens in UTC seconds (or
//! milliseconds) since midnight.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Timelike, Utc};
use std::sync::Mutex;

/// Trait for abstracting the current time.
pub trait TimeSource: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;

    /// Check if this is a manually controlled time source
    fn is_simulated(&self) -> bool {
        false
    }
}

/// Real-time implementation that uses actual system time
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
///
/// Useful for exercising the scheduler's temporal logic and for
/// reproducing a scenario at a fixed time of day.
pub struct ManualTimeSource {
    current: Mutex<DateTime<Utc>>,
}

impl ManualTimeSource {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Build a clock reading the given seconds-of-day on today's UTC date.
    pub fn at_seconds_of_day(seconds: i64) -> Self {
        let midnight = Utc::now()
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc();
        Self::new(midnight + ChronoDuration::seconds(seconds))
    }

    pub fn set(&self, time: DateTime<Utc>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = time;
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut guard = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Milliseconds since UTC midnight for the current sample of `source`.
pub fn millis_of_day(source: &dyn TimeSource) -> i64 {
    let now = source.now();
    i64::from(now.num_seconds_from_midnight()) * 1000 + i64::from(now.timestamp_subsec_millis())
}

/// Parse `HH:MM:SS` into seconds since midnight.
pub fn parse_time_of_day(s: &str) -> Result<i64> {
    let time = NaiveTime::parse_from_str(s, "%H:%M:%S")
        .with_context(|| format!("Invalid time '{s}'. Use HH:MM:SS"))?;
    Ok(i64::from(time.num_seconds_from_midnight()))
}
