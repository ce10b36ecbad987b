//! One-shot totality check for a location.

use anyhow::Result;

use crate::args::GlobalOptions;
use crate::geo::Location;
use crate::time_source::{ManualTimeSource, RealTimeSource, TimeSource, millis_of_day};

/// Run the locator once and log the totality window.
///
/// With `--at`, "now" is that time of day instead of the system clock.
pub fn handle_check_command(options: &GlobalOptions, location: Option<Location>) -> Result<()> {
    let (config, base_dir) = super::load_config()?;
    config.log_config(&base_dir);

    let location = super::resolve_location(location, &config)?;
    let mut locator = super::open_locator(&config, &base_dir, options.debug_enabled)?;

    let (clock, offset): (Box<dyn TimeSource>, i64) = match options.at {
        Some(at) => (Box::new(ManualTimeSource::at_seconds_of_day(at)), 0),
        None => (Box::new(RealTimeSource), config.time_offset()),
    };
    let now = millis_of_day(clock.as_ref()).div_euclid(1000) + offset;

    if let Some(totality) = super::check_location(&mut locator, location, options.debug_enabled)? {
        super::report_totality(&totality, now);
    }

    log_end!();
    Ok(())
}

/// Display detailed help for the check command
pub fn display_help() {
    log_version!();
    log_block_start!("check - Find the totality window for a location");
    log_block_start!("Usage: umbrawatch check [--lon <degrees> --lat <degrees>]");
    log_block_start!("Description:");
    log_indented!("Searches the shadow dataset for the shapes covering the location");
    log_indented!("and reports when totality starts and ends there. Without --lon");
    log_indented!("and --lat the configured latitude and longitude are used.");
    log_block_start!("Examples:");
    log_indented!("# Configured location");
    log_indented!("umbrawatch check");
    log_pipe!();
    log_indented!("# Carbondale, IL, as if it were 18:00 UTC");
    log_indented!("umbrawatch check --lon -89.2 --lat 37.7 --at 18:00:00");
    log_end!();
}
