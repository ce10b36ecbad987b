//! Totality search over time-ordered shadow footprints.
//!
//! A full scan walks every feature from the first one. After a hit, the
//! next query starts near the previous hit instead, shifted by how far the
//! observer moved in longitude. If that guess finds nothing, the cached
//! hit is dropped and the query is retried as a full scan.
//!
//! The search assumes feature ids follow the shadow's eastward travel in
//! time order. [`GeoJsonDataset::is_time_ordered`] checks the time half of
//! that assumption when a dataset is opened.
//!
//! [`GeoJsonDataset::is_time_ordered`]: super::dataset::GeoJsonDataset::is_time_ordered

use std::sync::Arc;

use super::dataset::ShadowDataset;
use super::error::UmbraError;
use crate::common::constants::*;
use crate::common::utils::Hms;

/// Empirical knobs for the locality heuristic and the scan loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatorTuning {
    pub eastward_scale: f64,
    pub westward_scale: f64,
    pub back_scan: i64,
    pub scan_window: i64,
    pub miss_threshold: u32,
    pub prefilter_tolerance: f64,
}

impl Default for LocatorTuning {
    fn default() -> Self {
        Self {
            eastward_scale: EASTWARD_SCALE,
            westward_scale: WESTWARD_SCALE,
            back_scan: BACK_SCAN,
            scan_window: SCAN_WINDOW,
            miss_threshold: MISS_THRESHOLD,
            prefilter_tolerance: PREFILTER_TOLERANCE,
        }
    }
}

/// Counters describing the work done by [`UmbraLocator::check`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub checks: u64,
    /// Scans that started from the first feature, retries included.
    pub full_scans: u64,
    /// Scans seeded from the previous hit.
    pub heuristic_scans: u64,
    /// Heuristic scans that found nothing and fell back to a full scan.
    pub retries: u64,
    pub features_visited: u64,
    pub polygon_tests: u64,
}

/// The totality window found by the last successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totality {
    pub start: i64,
    pub end: i64,
}

impl Totality {
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy)]
struct Span {
    first_id: usize,
    start: i64,
    end: i64,
}

/// Finds whether, and when, a point lies inside the moving shadow.
///
/// Not meant for concurrent use; give each caller its own locator over a
/// shared dataset.
pub struct UmbraLocator<D: ShadowDataset> {
    dataset: Arc<D>,
    tuning: LocatorTuning,
    total: usize,
    last_hit: Option<usize>,
    last_lon: f64,
    start: Option<i64>,
    end: Option<i64>,
    stats: ScanStats,
    verbose: bool,
}

impl<D: ShadowDataset> UmbraLocator<D> {
    pub fn new(dataset: Arc<D>) -> Self {
        Self::with_tuning(dataset, LocatorTuning::default())
    }

    pub fn with_tuning(dataset: Arc<D>, tuning: LocatorTuning) -> Self {
        let total = dataset.feature_count();
        Self {
            dataset,
            tuning,
            total,
            last_hit: None,
            last_lon: 0.0,
            start: None,
            end: None,
            stats: ScanStats::default(),
            verbose: false,
        }
    }

    /// Log every visited feature and the resulting totality window.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Report whether `(lon, lat)` falls inside any shadow footprint.
    ///
    /// On `Ok(true)` the containment start and end are updated; on
    /// `Ok(false)` they keep whatever the last success left there.
    pub fn check(&mut self, lon: f64, lat: f64) -> Result<bool, UmbraError> {
        self.stats.checks += 1;

        let found = match self.last_hit {
            Some(hit) => {
                self.stats.heuristic_scans += 1;
                let start = self.heuristic_start(hit, lon);
                match self.scan(start, lon, lat)? {
                    Some(span) => Some(span),
                    None => {
                        // the guess may have jumped past the shadow
                        self.last_hit = None;
                        self.stats.retries += 1;
                        self.stats.full_scans += 1;
                        self.scan(0, lon, lat)?
                    }
                }
            }
            None => {
                self.stats.full_scans += 1;
                self.scan(0, lon, lat)?
            }
        };

        self.last_lon = lon;

        let Some(span) = found else {
            return Ok(false);
        };
        self.last_hit = Some(span.first_id);
        self.start = Some(span.start);
        self.end = Some(span.end);

        if self.verbose {
            log_decorated!(
                "Totality: {} to {}, duration {}",
                Hms::from_seconds(span.start),
                Hms::from_seconds(span.end),
                Hms::from_seconds(span.end - span.start).duration()
            );
        }
        Ok(true)
    }

    /// Seconds-of-day of the first containing feature.
    pub fn containment_start(&self) -> Option<i64> {
        self.start
    }

    /// Seconds-of-day of the last containing feature.
    pub fn containment_end(&self) -> Option<i64> {
        self.end
    }

    pub fn totality(&self) -> Option<Totality> {
        Some(Totality {
            start: self.start?,
            end: self.end?,
        })
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn feature_count(&self) -> usize {
        self.total
    }

    fn heuristic_start(&self, hit: usize, lon: f64) -> usize {
        let delta = lon - self.last_lon;
        let scale = if delta >= 0.0 {
            self.tuning.eastward_scale
        } else {
            self.tuning.westward_scale
        };
        let offset = (delta * scale) as i64;
        let candidate = hit as i64 - self.tuning.back_scan + offset;
        let upper = (self.total as i64 - self.tuning.scan_window).max(0);
        candidate.clamp(0, upper) as usize
    }

    fn scan(&mut self, start: usize, lon: f64, lat: f64) -> Result<Option<Span>, UmbraError> {
        let dataset = Arc::clone(&self.dataset);
        if dataset.feature(start).is_none() {
            return Err(UmbraError::FeatureMissing { index: start });
        }

        let tolerance = self.tuning.prefilter_tolerance;
        let mut span: Option<Span> = None;
        let mut missed = 0u32;

        for feature in dataset.features_from(start) {
            self.stats.features_visited += 1;
            if self.verbose {
                log_debug!(
                    "Checking {} ({}, {})",
                    Hms::from_seconds(feature.time),
                    feature.center_lon,
                    feature.center_lat
                );
            }

            // Cheap rectangle test, only until the first hit; near the
            // shadow edge the centers are too coarse to trust
            if span.is_none()
                && ((lon - feature.center_lon).abs() > tolerance
                    || (lat - feature.center_lat).abs() > tolerance)
            {
                continue;
            }
            if feature.polygon.is_none() {
                continue;
            }

            self.stats.polygon_tests += 1;
            if feature.contains(lon, lat) {
                match span.as_mut() {
                    Some(span) => {
                        span.end = feature.time;
                        missed = 0;
                    }
                    None => {
                        span = Some(Span {
                            first_id: feature.id,
                            start: feature.time,
                            end: feature.time,
                        });
                    }
                }
            } else if span.is_some() {
                missed += 1;
                if missed >= self.tuning.miss_threshold {
                    break;
                }
            }
        }

        Ok(span)
    }
}
