//! Background alert scheduler.
//!
//! One worker thread owns the buzzer and sleeps until the next record is
//! due, waking early whenever a producer changes the record set or the time
//! offset. Records, the pending page, and the offset share a single mutex;
//! the worker releases it while a waveform plays so producers never wait
//! on audio.
//!
//! ```no_run
//! use std::sync::Arc;
//! use umbrawatch::alert::{AlertKind, AlertScheduler};
//! use umbrawatch::time_source::RealTimeSource;
//!
//! # fn main() -> anyhow::Result<()> {
//! let scheduler = AlertScheduler::new(Arc::new(RealTimeSource), None)?;
//! scheduler.add(65_861, 0, 3, AlertKind::Time);
//! // once per UI frame
//! if let Some(page) = scheduler.change_to_page() {
//!     println!("switch to page {page}");
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::book::{AlertBook, AlertRecord, PageId};
use super::buzzer::{self, Buzzer};
use super::kind::AlertKind;
use crate::common::constants::{FIRE_THRESHOLD_MS, MAX_WAIT_MS, SCHEDULER_THREAD_NAME};
use crate::time_source::{self, TimeSource};

/// Page-change request handed from the worker to the UI loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingPage {
    #[default]
    None,
    Page(PageId),
    /// The scheduler is being dropped; the worker must exit.
    Shutdown,
}

#[derive(Debug, Default)]
struct SchedulerState {
    records: AlertBook,
    pending: PendingPage,
    time_offset: i64,
}

struct Shared {
    state: Mutex<SchedulerState>,
    change: Condvar,
    clock: Arc<dyn TimeSource>,
    running: Option<Arc<AtomicBool>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn should_exit(&self, state: &SchedulerState) -> bool {
        state.pending == PendingPage::Shutdown
            || self
                .running
                .as_ref()
                .is_some_and(|running| !running.load(Ordering::SeqCst))
    }
}

/// Time-ordered alert queue with a dedicated worker thread.
pub struct AlertScheduler {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl AlertScheduler {
    /// Start a scheduler sampling `clock`. Without a buzzer, alerts only
    /// request page changes.
    pub fn new(clock: Arc<dyn TimeSource>, buzzer: Option<Box<dyn Buzzer>>) -> Result<Self> {
        Self::spawn(clock, buzzer, None)
    }

    /// Like [`AlertScheduler::new`], also stopping once `running` turns false.
    ///
    /// The flag is observed whenever the worker wakes.
    pub fn with_running_flag(
        clock: Arc<dyn TimeSource>,
        buzzer: Option<Box<dyn Buzzer>>,
        running: Arc<AtomicBool>,
    ) -> Result<Self> {
        Self::spawn(clock, buzzer, Some(running))
    }

    fn spawn(
        clock: Arc<dyn TimeSource>,
        buzzer: Option<Box<dyn Buzzer>>,
        running: Option<Arc<AtomicBool>>,
    ) -> Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(SchedulerState::default()),
            change: Condvar::new(),
            clock,
            running,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(SCHEDULER_THREAD_NAME.into())
            .spawn(move || run(&worker_shared, buzzer))
            .context("Failed to start alert scheduler thread")?;

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Queue an alert for `time` (seconds since UTC midnight).
    pub fn add(&self, time: i64, priority: i32, page: PageId, sound: AlertKind) {
        let mut state = self.shared.lock();
        state.records.insert(AlertRecord {
            time,
            priority,
            page,
            sound,
        });
        self.shared.change.notify_one();
    }

    /// Cancel every queued alert targeting `page`.
    pub fn remove(&self, page: PageId) {
        let mut state = self.shared.lock();
        state.records.remove_page(page);
        self.shared.change.notify_one();
    }

    /// Take the page requested by the most recent alert, if any.
    pub fn change_to_page(&self) -> Option<PageId> {
        let mut state = self.shared.lock();
        match state.pending {
            PendingPage::Page(page) => {
                state.pending = PendingPage::None;
                Some(page)
            }
            PendingPage::None | PendingPage::Shutdown => None,
        }
    }

    /// Shift every "now" computation by `offset` seconds.
    pub fn set_time_offset(&self, offset: i64) {
        let mut state = self.shared.lock();
        state.time_offset = offset;
        self.shared.change.notify_one();
    }

    pub fn time_offset(&self) -> i64 {
        self.shared.lock().time_offset
    }

    /// Number of alerts still waiting to fire.
    pub fn pending_alerts(&self) -> usize {
        self.shared.lock().records.len()
    }
}

impl Drop for AlertScheduler {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock();
            state.records.clear();
            state.pending = PendingPage::Shutdown;
        }
        self.shared.change.notify_all();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log_error!("Alert scheduler thread panicked");
        }
    }
}

fn run(shared: &Shared, mut buzzer: Option<Box<dyn Buzzer>>) {
    let mut state = shared.lock();
    loop {
        if shared.should_exit(&state) {
            break;
        }
        if state.records.is_empty() {
            state = shared
                .change
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
            continue;
        }

        // Records and offsets are arbitrary i64 values; saturate instead of overflowing
        let now_ms = time_source::millis_of_day(shared.clock.as_ref())
            .saturating_add(state.time_offset.saturating_mul(1000));
        // Missed alerts are dropped, never played late
        state.records.discard_before(now_ms.div_euclid(1000));

        let Some(next) = state.records.next_due() else {
            continue;
        };

        let delay = next
            .time
            .saturating_mul(1000)
            .saturating_sub(now_ms)
            .saturating_sub(next.sound.lead_time_ms());
        if delay < FIRE_THRESHOLD_MS {
            state.pending = PendingPage::Page(next.page);
            state.records.remove_time(next.time);
            drop(state);

            if let Some(buzzer) = buzzer.as_deref_mut() {
                buzzer::play(buzzer, next.sound);
            }

            state = shared.lock();
        } else {
            let (guard, _) = shared
                .change
                .wait_timeout(state, Duration::from_millis(delay.min(MAX_WAIT_MS) as u64))
                .unwrap_or_else(|e| e.into_inner());
            state = guard;
        }
    }
}
