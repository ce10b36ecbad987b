//! Unix signal handling.
//!
//! SIGINT, SIGTERM, and SIGHUP all request a shutdown. The handler thread
//! clears the shared `running` flag, which the alert scheduler's worker
//! also watches, and forwards a message so a blocked main loop wakes up.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::{self, Receiver},
    thread,
};

/// Messages sent from the signal thread to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    Shutdown { signal: i32 },
}

/// Signal handling state shared between threads
pub struct SignalState {
    /// Cleared once a termination signal arrives
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
}

impl SignalState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn describe(signal: i32) -> &'static str {
    match signal {
        SIGINT => "interrupt",
        SIGTERM => "termination request",
        SIGHUP => "hangup",
        _ => "signal",
    }
}

/// Install the handlers and spawn the thread that services them.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let (signal_sender, signal_receiver) = mpsc::channel::<SignalMessage>();

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    let running_clone = Arc::clone(&running);
    thread::Builder::new()
        .name("signal-handler".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                if debug_enabled {
                    log_pipe!();
                    log_debug!("Signal handler received signal {signal}");
                }
                log_pipe!();
                log_info!("Received {}, shutting down...", describe(signal));

                running_clone.store(false, Ordering::SeqCst);

                // The receiver is gone once main has returned
                if signal_sender.send(SignalMessage::Shutdown { signal }).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn signal handler thread")?;

    Ok(SignalState {
        running,
        signal_receiver,
    })
}
