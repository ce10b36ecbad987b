//! Observer location helpers.
//!
//! The locator is expensive enough that the position loop should not run
//! it on every GPS fix. [`RecheckPolicy`] decides when a new check is worth
//! doing, [`PositionTracker`] feeds it from a stream of fixes, and
//! [`Location`] carries the coordinates and distance math.

pub mod recheck;
pub mod tracker;

pub use recheck::{RecheckPolicy, SpeedAverage};
pub use tracker::PositionTracker;

use std::ops::Add;

use crate::common::constants::EARTH_RADIUS_M;

/// A position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    pub lon: f64,
    pub lat: f64,
}

impl Location {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Approximate great-circle distance in meters (haversine).
    pub fn distance_to(&self, other: &Location) -> f64 {
        let lat0 = self.lat.to_radians();
        let lat1 = other.lat.to_radians();
        let lat_sin = ((other.lat - self.lat).to_radians() / 2.0).sin();
        let lon_sin = ((other.lon - self.lon).to_radians() / 2.0).sin();
        2.0 * EARTH_RADIUS_M
            * (lat_sin * lat_sin + lat0.cos() * lat1.cos() * lon_sin * lon_sin)
                .sqrt()
                .min(1.0)
                .asin()
    }

    /// Both coordinates are finite numbers.
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

// Offsets are added per component, which distorts distances away from
// the equator.
impl Add for Location {
    type Output = Location;

    fn add(self, rhs: Location) -> Location {
        Location::new(self.lon + rhs.lon, self.lat + rhs.lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero() {
        let here = Location::new(-89.2, 37.7);
        assert_eq!(here.distance_to(&here), 0.0);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = Location::new(0.0, 0.0);
        let b = Location::new(0.0, 1.0);
        let expected = EARTH_RADIUS_M * 1f64.to_radians();
        assert!((a.distance_to(&b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_offset_arithmetic() {
        let base = Location::new(-89.0, 37.0);
        let offset = Location::new(0.5, -0.25);
        assert_eq!(base + offset, Location::new(-88.5, 36.75));
        assert_eq!(base + Location::default(), base);
    }

    #[test]
    fn test_validity() {
        assert!(Location::new(1.0, 2.0).is_valid());
        assert!(!Location::new(f64::NAN, 2.0).is_valid());
    }
}
