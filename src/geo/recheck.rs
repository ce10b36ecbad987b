//! When to re-run the totality check while the observer moves.

use chrono::{DateTime, Duration, Utc};

use super::Location;
use crate::common::constants::*;

/// Exponential moving average of ground speed in m/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpeedAverage {
    value: f64,
}

impl SpeedAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, sample: f64) -> f64 {
        self.value = (1.0 - SPEED_SAMPLE_WEIGHT) * self.value + SPEED_SAMPLE_WEIGHT * sample;
        self.value
    }

    /// Forget the history, e.g. after losing the GPS connection.
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Rate limit for locator checks.
///
/// A check is due when enough time has passed or the observer jumped far,
/// but only once they have slowed down and actually moved past GPS noise.
#[derive(Debug, Clone, Default)]
pub struct RecheckPolicy {
    last: Option<(DateTime<Utc>, Location)>,
}

impl RecheckPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_due(&self, now: DateTime<Utc>, location: &Location, speed: f64) -> bool {
        let Some((checked_at, checked_loc)) = &self.last else {
            return true;
        };
        let moved = checked_loc.distance_to(location);
        let stale = now - *checked_at > Duration::seconds(RECHECK_INTERVAL_SECS);
        (stale || moved > RECHECK_FAR_DISTANCE_M)
            && speed < RECHECK_MAX_SPEED
            && moved > RECHECK_MIN_DISTANCE_M
    }

    pub fn record(&mut self, now: DateTime<Utc>, location: Location) {
        self.last = Some((now, location));
    }

    pub fn last_checked(&self) -> Option<Location> {
        self.last.map(|(_, location)| location)
    }
}
