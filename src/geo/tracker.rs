//! Turns a stream of GPS fixes into locator checks.

use chrono::{DateTime, Utc};

use super::{Location, RecheckPolicy, SpeedAverage};

/// Speed history and recheck state for one receiver.
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    offset: Location,
    speed: SpeedAverage,
    policy: RecheckPolicy,
}

impl PositionTracker {
    /// `offset` is added to every reported position, to rehearse away from
    /// the actual site.
    pub fn new(offset: Location) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    /// Feed one fix. Returns the position to check when a check is due.
    pub fn update(
        &mut self,
        now: DateTime<Utc>,
        location: Option<Location>,
        speed: Option<f64>,
    ) -> Option<Location> {
        if let Some(speed) = speed {
            self.speed.update(speed);
        }

        let location = location? + self.offset;
        if !self.policy.is_due(now, &location, self.speed.value()) {
            return None;
        }

        if let Some(previous) = self.policy.last_checked() {
            log_debug!(
                "Moved {:.0} m since the last check, averaging {:.1} m/s",
                previous.distance_to(&location),
                self.speed.value()
            );
        }
        self.policy.record(now, location);
        Some(location)
    }

    /// The receiver went away; its speed history no longer applies.
    pub fn signal_lost(&mut self) {
        self.speed.reset();
    }

    pub fn speed(&self) -> f64 {
        self.speed.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::logger::Log;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 8, 17, 0, 0).unwrap()
    }

    #[test]
    fn test_first_fix_is_checked_with_offset() {
        Log::set_enabled(false);
        let mut tracker = PositionTracker::new(Location::new(0.5, -0.25));
        let checked = tracker.update(t0(), Some(Location::new(-89.7, 37.95)), Some(0.0));
        assert_eq!(checked, Some(Location::new(-89.2, 37.7)));
    }

    #[test]
    fn test_speed_only_fix_updates_average() {
        let mut tracker = PositionTracker::new(Location::default());
        assert_eq!(tracker.update(t0(), None, Some(10.0)), None);
        assert!((tracker.speed() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_recheck_waits_for_slow_movement() {
        Log::set_enabled(false);
        let mut tracker = PositionTracker::new(Location::default());
        let start = Location::new(-89.2, 37.7);
        assert!(tracker.update(t0(), Some(start), Some(0.0)).is_some());

        // about 2.2 km north but driving fast: deferred
        let far = Location::new(-89.2, 37.72);
        for _ in 0..10 {
            assert_eq!(tracker.update(t0() + Duration::seconds(30), Some(far), Some(20.0)), None);
        }

        // stopped there; the average decays below 2.5 m/s after a while
        let mut checked = None;
        for i in 0..20 {
            checked = tracker.update(t0() + Duration::seconds(40 + i), Some(far), Some(0.0));
            if checked.is_some() {
                break;
            }
        }
        assert_eq!(checked, Some(far));
        // the same spot is not checked again
        assert_eq!(tracker.update(t0() + Duration::seconds(400), Some(far), Some(0.0)), None);
    }

    #[test]
    fn test_signal_lost_resets_speed() {
        let mut tracker = PositionTracker::new(Location::default());
        tracker.update(t0(), None, Some(5.0));
        tracker.signal_lost();
        assert_eq!(tracker.speed(), 0.0);
    }
}
