//! Application-wide constants.
//!
//! The shadow-locator tuning values were measured against the NASA umbra
//! shapes (roughly 130 shapes per degree of longitude, up to 161 of them
//! overlapping any one point). They are empirical; change them only after
//! re-running the locator against a real dataset.

// # Process

pub const EXIT_FAILURE: i32 = 1;

// # Configuration

pub const CONFIG_DIR_NAME: &str = "umbrawatch";
pub const CONFIG_FILE_NAME: &str = "umbrawatch.toml";

pub const DEFAULT_DATASET: &str = "umbra_hi.geojson";
pub const DEFAULT_LAYER: &str = "umbra_hi";
pub const DEFAULT_TIME_FIELD: &str = "UTCSec";
pub const DEFAULT_CENTER_LON_FIELD: &str = "CenterLon";
pub const DEFAULT_CENTER_LAT_FIELD: &str = "CenterLat";

/// Largest accepted test offset, in either direction.
pub const MAXIMUM_TIME_OFFSET: i64 = 86_400;

// # Alert scheduler

/// A record whose wake delay falls below this is fired immediately.
pub const FIRE_THRESHOLD_MS: i64 = 16;

pub const SCHEDULER_THREAD_NAME: &str = "alert-scheduler";

/// Longest single sleep of the scheduler worker; it re-samples the clock after.
pub const MAX_WAIT_MS: i64 = 60_000;

// # Shadow locator

/// Features per degree of eastward movement since the previous query.
pub const EASTWARD_SCALE: f64 = 34.0;

/// Features per degree of westward movement; larger than the eastward
/// scale so the search starts well behind the shadow.
pub const WESTWARD_SCALE: f64 = 138.0;

/// Features stepped back from the previous hit before applying movement.
pub const BACK_SCAN: i64 = 162;

/// Minimum number of features left between the start id and the end of
/// the dataset.
pub const SCAN_WINDOW: i64 = 256;

/// Consecutive polygon misses after a hit that end a scan.
pub const MISS_THRESHOLD: u32 = 4;

/// Degrees of longitude or latitude between the query point and a
/// feature's approximate center beyond which the polygon test is skipped.
pub const PREFILTER_TOLERANCE: f64 = 1.4;

// # Observer location

/// Approximate Earth radius in meters for haversine distances.
pub const EARTH_RADIUS_M: f64 = 6_365_000.0;

/// Re-run the locator at least this often while moving slowly.
pub const RECHECK_INTERVAL_SECS: i64 = 128;

/// A jump this large (meters) justifies a check before the interval.
pub const RECHECK_FAR_DISTANCE_M: f64 = 1024.0;

/// Ignore movement smaller than this (meters); GPS noise.
pub const RECHECK_MIN_DISTANCE_M: f64 = 64.0;

/// Checks are deferred while the averaged speed is at or above this (m/s).
pub const RECHECK_MAX_SPEED: f64 = 2.5;

/// Weight of the newest sample in the speed moving average.
pub const SPEED_SAMPLE_WEIGHT: f64 = 0.2;

// # GPS

pub const DEFAULT_GPSD_ADDRESS: &str = "localhost:2947";

/// Sent after connecting so gpsd streams JSON reports.
pub const GPSD_WATCH_REQUEST: &str = "?WATCH={\"enable\":true,\"json\":true};\n";

/// Longest wait for a report before the connection is polled again.
pub const GPSD_READ_TIMEOUT_SECS: u64 = 5;

/// Pause between attempts to reach gpsd.
pub const GPSD_RECONNECT_DELAY_SECS: u64 = 2;

pub const GPSD_THREAD_NAME: &str = "gpsd-reader";

#[cfg(test)]
pub mod test_constants {
    /// 18:00:00 UTC, a convenient clock reading for scheduler tests.
    pub const TEST_SECONDS_OF_DAY: i64 = 64_800;
}
