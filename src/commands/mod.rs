//! Command-line command handlers.
//!
//! Each command lives in its own submodule. The helpers here cover what
//! several of them share: loading the configuration, opening the shadow
//! dataset, and reporting a totality window.

pub mod buzz;
pub mod check;
pub mod help;
pub mod watch;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::args::GlobalOptions;
use crate::common::utils::{Hms, private_path};
use crate::config::{self, Config};
use crate::geo::Location;
use crate::time_source::{TimeSource, millis_of_day};
use crate::umbra::{GeoJsonDataset, ShadowDataset, Totality, UmbraLocator};

/// Load the configuration and the directory relative paths resolve against.
pub(crate) fn load_config() -> Result<(Config, PathBuf)> {
    let config = config::load()?;
    let base_dir = config::loading::get_config_base_dir()?;
    Ok((config, base_dir))
}

/// Location from the command line, else from the configuration.
pub(crate) fn resolve_location(given: Option<Location>, config: &Config) -> Result<Location> {
    given.or_else(|| config.location()).context(
        "No location available. Pass --lon and --lat, or set latitude and longitude in the configuration",
    )
}

/// Offset that makes `clock` read as the requested time of day.
///
/// `--at` overrides the configured `time_offset`.
pub(crate) fn effective_offset(
    options: &GlobalOptions,
    config: &Config,
    clock: &dyn TimeSource,
) -> i64 {
    match options.at {
        Some(at) => at - millis_of_day(clock).div_euclid(1000),
        None => config.time_offset(),
    }
}

/// Open the configured dataset and wrap it in a locator.
pub(crate) fn open_locator(
    config: &Config,
    base_dir: &Path,
    verbose: bool,
) -> Result<UmbraLocator<GeoJsonDataset>> {
    let path = config.dataset_path(base_dir);
    let dataset = GeoJsonDataset::open(&path, &config.dataset_fields())
        .with_context(|| format!("Failed to load shadow dataset {}", private_path(&path)))?;

    log_block_start!("Loaded {} shadow shapes", dataset.feature_count());
    if let Some((first, last)) = dataset.time_span() {
        log_indented!(
            "Covering {} to {} UTC",
            Hms::from_seconds(first).time().trim_start(),
            Hms::from_seconds(last).time().trim_start()
        );
    }

    let mut locator = UmbraLocator::new(Arc::new(dataset));
    locator.set_verbose(verbose || config.verbose());
    Ok(locator)
}

/// Log the window and where `now` falls relative to it.
pub(crate) fn report_totality(totality: &Totality, now: i64) {
    log_block_start!(
        "Totality from {} to {} UTC",
        Hms::from_seconds(totality.start).time().trim_start(),
        Hms::from_seconds(totality.end).time().trim_start()
    );
    log_indented!(
        "Duration: {}",
        Hms::from_seconds(totality.duration()).duration()
    );

    if now < totality.start {
        log_indented!(
            "Begins in {}",
            Hms::from_seconds(totality.start - now).duration()
        );
    } else if now <= totality.end {
        log_indented!(
            "In progress, ends in {}",
            Hms::from_seconds(totality.end - now).duration()
        );
    } else {
        log_indented!(
            "Ended {} ago",
            Hms::from_seconds(now - totality.end).duration()
        );
    }
}

/// Log where the locator was pointed and what it found.
pub(crate) fn check_location(
    locator: &mut UmbraLocator<GeoJsonDataset>,
    location: Location,
    debug_enabled: bool,
) -> Result<Option<Totality>> {
    log_block_start!(
        "Checking {:.4}°{}, {:.4}°{}",
        location.lat.abs(),
        if location.lat >= 0.0 { "N" } else { "S" },
        location.lon.abs(),
        if location.lon >= 0.0 { "E" } else { "W" }
    );

    let inside = locator.check(location.lon, location.lat)?;

    if debug_enabled {
        let stats = locator.stats();
        log_debug!(
            "Scans: {} full, {} heuristic, {} retried; {} shapes visited, {} polygon tests",
            stats.full_scans,
            stats.heuristic_scans,
            stats.retries,
            stats.features_visited,
            stats.polygon_tests
        );
    }

    if !inside {
        log_indented!("Outside the path of totality");
        return Ok(None);
    }
    Ok(locator.totality())
}
