//! Play a single alert to verify the buzzer wiring.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use crate::alert::{AlertKind, AlertScheduler, PageId, configure_buzzer};
use crate::args::GlobalOptions;
use crate::common::utils::Hms;
use crate::io::signals::{SignalMessage, setup_signal_handler};
use crate::time_source::{RealTimeSource, TimeSource, millis_of_day};

/// Page requested by the test alert; nothing displays it.
const BUZZ_PAGE: PageId = 0;

/// Longest wait for the alert to fire, beyond its lead time.
const FIRE_TIMEOUT: Duration = Duration::from_secs(5);

pub fn handle_buzz_command(options: &GlobalOptions, kind: AlertKind) -> Result<()> {
    let signal_state = setup_signal_handler(options.debug_enabled)?;
    let (config, _) = super::load_config()?;

    let buzzer = configure_buzzer(config.buzzer.as_deref());
    if buzzer.is_none() {
        log_pipe!();
        log_warning!("No buzzer output; the alert will only request a page change");
    }

    let clock: Arc<dyn TimeSource> = Arc::new(RealTimeSource);
    let now = millis_of_day(clock.as_ref()).div_euclid(1000);
    // whole seconds ahead so the lead time never lands in the past
    let at = now + 1 + (kind.lead_time_ms() + 999) / 1000;

    let running = Arc::clone(&signal_state.running);
    let scheduler = AlertScheduler::with_running_flag(clock, buzzer, running)
        .context("Failed to start the alert scheduler")?;
    scheduler.add(at, 0, BUZZ_PAGE, kind);

    log_block_start!(
        "Playing {kind} alert for {} UTC",
        Hms::from_seconds(at).time().trim_start()
    );

    let deadline = std::time::Instant::now()
        + Duration::from_secs((at - now) as u64)
        + FIRE_TIMEOUT;
    let fired = loop {
        if scheduler.change_to_page().is_some() {
            break true;
        }
        if std::time::Instant::now() >= deadline {
            break false;
        }
        match signal_state
            .signal_receiver
            .recv_timeout(Duration::from_millis(50))
        {
            Ok(SignalMessage::Shutdown { .. }) | Err(RecvTimeoutError::Disconnected) => {
                break false;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
    };

    // Waits for the waveform to finish
    drop(scheduler);

    if fired {
        log_decorated!("Played {} ms waveform", kind.playback_ms());
    } else {
        log_decorated!("Alert did not fire");
    }
    log_end!();
    Ok(())
}

/// Display detailed help for the buzz command
pub fn display_help() {
    log_version!();
    log_block_start!("buzz - Play one alert through the scheduler");
    log_block_start!("Usage: umbrawatch buzz <none|notice|time|warning>");
    log_block_start!("Alert kinds:");
    log_indented!("none     Page change only, no sound");
    log_indented!("notice   Two short beeps");
    log_indented!("time     Three beeps counting down, then a long tone");
    log_indented!("warning  One medium beep");
    log_block_start!("Examples:");
    log_indented!("umbrawatch buzz notice");
    log_indented!("umbrawatch --config ~/eclipse buzz time");
    log_end!();
}
