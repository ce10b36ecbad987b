//! Locate the observer, schedule the eclipse alerts, and wait for them.
//!
//! With a fixed location the check runs once. With a gpsd receiver every
//! fix goes through a [`PositionTracker`]; when it asks for a new check and
//! the totality window changes, the previous alerts are replaced.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::alert::{AlertScheduler, TOTALITY_PAGE, configure_buzzer, totality_alerts, totality_plan};
use crate::args::GlobalOptions;
use crate::common::utils::Hms;
use crate::geo::{Location, PositionTracker};
use crate::io::gpsd::{self, GpsMessage};
use crate::io::signals::{SignalMessage, setup_signal_handler};
use crate::time_source::{RealTimeSource, TimeSource, millis_of_day};
use crate::umbra::{GeoJsonDataset, Totality, UmbraLocator};

/// How often signals, fixes, and the page-change request are polled.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

enum PositionSource {
    Fixed(Location),
    /// `host:port` of gpsd
    Gpsd(String),
}

/// The locator and scheduler for one run of `watch`.
struct TotalityWatch {
    locator: UmbraLocator<GeoJsonDataset>,
    scheduler: AlertScheduler,
    clock: Arc<dyn TimeSource>,
    offset: i64,
    debug_enabled: bool,
    current: Option<Totality>,
    last_alert: Option<i64>,
}

impl TotalityWatch {
    /// Scheduler time of day, in seconds.
    fn now(&self) -> i64 {
        millis_of_day(self.clock.as_ref()).div_euclid(1000) + self.offset
    }

    /// Check `location` and reschedule if the window changed.
    fn check(&mut self, location: Location) -> Result<()> {
        let found = super::check_location(&mut self.locator, location, self.debug_enabled)?;
        if found == self.current {
            if found.is_some() {
                log_indented!("Totality window unchanged");
            }
            return Ok(());
        }

        self.scheduler.remove(TOTALITY_PAGE);
        self.current = found;
        self.last_alert = None;

        let Some(totality) = found else {
            log_indented!("Cleared scheduled alerts");
            return Ok(());
        };

        let now = self.now();
        super::report_totality(&totality, now);

        log_block_start!("Timetable (UTC)");
        for event in totality_plan(&totality).iter().filter(|e| e.time >= now) {
            log_indented!(
                "{}  {}",
                Hms::from_seconds(event.time).time(),
                event.step
            );
        }

        let records = totality_alerts(&totality, 0);
        let upcoming = records.iter().filter(|r| r.time >= now).count();
        self.last_alert = records.last().map(|r| r.time);
        for record in records {
            self.scheduler
                .add(record.time, record.priority, record.page, record.sound);
        }
        log_indented!("Scheduled {upcoming} alerts");
        Ok(())
    }

    fn log_page_change(&self) {
        if let Some(page) = self.scheduler.change_to_page() {
            log_info!(
                "Alert at {} UTC, switch to page {page}",
                Hms::from_seconds(self.now()).time().trim_start()
            );
        }
    }

    /// Every alert of the current window has fired or been dropped.
    fn finished(&self) -> bool {
        self.last_alert.is_some_and(|last| self.now() > last)
            && self.scheduler.pending_alerts() == 0
    }
}

pub fn handle_watch_command(options: &GlobalOptions, location: Option<Location>) -> Result<()> {
    let signal_state = setup_signal_handler(options.debug_enabled)?;

    let (config, base_dir) = super::load_config()?;
    config.log_config(&base_dir);

    // --lon/--lat pin the position even when a receiver is configured
    let source = match (location, config.gpsd.clone()) {
        (Some(location), _) => PositionSource::Fixed(location),
        (None, Some(address)) => PositionSource::Gpsd(address),
        (None, None) => PositionSource::Fixed(super::resolve_location(None, &config)?),
    };
    let locator = super::open_locator(&config, &base_dir, options.debug_enabled)?;

    let clock: Arc<dyn TimeSource> = Arc::new(RealTimeSource);
    let offset = super::effective_offset(options, &config, clock.as_ref());

    let buzzer = configure_buzzer(config.buzzer.as_deref());
    let scheduler = AlertScheduler::with_running_flag(
        Arc::clone(&clock),
        buzzer,
        Arc::clone(&signal_state.running),
    )
    .context("Failed to start the alert scheduler")?;
    scheduler.set_time_offset(offset);

    let mut watch = TotalityWatch {
        locator,
        scheduler,
        clock,
        offset,
        debug_enabled: options.debug_enabled,
        current: None,
        last_alert: None,
    };

    let fixes: Option<Receiver<GpsMessage>> = match source {
        PositionSource::Fixed(location) => {
            watch.check(location)?;
            if watch.current.is_none() {
                log_end!();
                return Ok(());
            }
            None
        }
        PositionSource::Gpsd(address) => {
            log_block_start!("Waiting for GPS fixes from {address}");
            Some(gpsd::spawn_reader(
                address,
                Arc::clone(&signal_state.running),
            )?)
        }
    };
    let mut tracker = PositionTracker::new(config.position_offset());

    loop {
        match signal_state.signal_receiver.recv_timeout(POLL_INTERVAL) {
            Ok(SignalMessage::Shutdown { .. }) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        if let Some(fixes) = &fixes {
            for message in fixes.try_iter() {
                let due = match message {
                    GpsMessage::Fix(fix) => {
                        tracker.update(watch.clock.now(), fix.location, fix.speed)
                    }
                    GpsMessage::Lost => {
                        tracker.signal_lost();
                        None
                    }
                };
                if let Some(location) = due {
                    watch.check(location)?;
                }
            }
        }

        watch.log_page_change();
        if watch.finished() {
            log_block_start!("No alerts remaining");
            break;
        }
    }

    watch.log_page_change();
    // Dropping the scheduler waits for a waveform still playing
    drop(watch);
    log_end!();
    Ok(())
}

/// Display detailed help for the watch command
pub fn display_help() {
    log_version!();
    log_block_start!("watch - Sound the eclipse alerts for a location");
    log_block_start!("Usage: umbrawatch watch [--lon <degrees> --lat <degrees>]");
    log_block_start!("Description:");
    log_indented!("Finds the totality window like 'check', then schedules photo");
    log_indented!("prompts through both partial phases, countdowns to each contact");
    log_indented!("of totality, and a warning at mid-totality. Runs until the last");
    log_indented!("alert has played or a termination signal arrives.");
    log_block_start!("GPS:");
    log_indented!("With 'gpsd' set in the configuration and no --lon/--lat, the");
    log_indented!("location follows the receiver. The check is repeated after the");
    log_indented!("observer moves and slows down, and the alerts are replaced when");
    log_indented!("the totality window changes.");
    log_block_start!("Rehearsal:");
    log_indented!("--at HH:MM:SS shifts the clock so the current moment reads as");
    log_indented!("the given UTC time; time_offset in the configuration does the");
    log_indented!("same with a fixed number of seconds. offset_latitude and");
    log_indented!("offset_longitude shift every GPS position.");
    log_end!();
}
