//! Temporal alert scheduling.
//!
//! Alerts are `(time, priority, page, sound)` records. The scheduler fires
//! the earliest one when it falls due (early by its waveform's lead time so
//! the sound lands on the moment), asks the UI to switch pages, and drops
//! any other record sharing that exact time.
//!
//! - [`kind`]: alert kinds and their buzzer waveforms
//! - [`book`]: record storage indexed by time and by page
//! - [`buzzer`]: the output seam and waveform playback
//! - [`plan`]: the eclipse timetable and its alerts
//! - [`scheduler`]: the worker thread and producer API

pub mod book;
pub mod buzzer;
pub mod kind;
pub mod plan;
pub mod scheduler;

pub use book::{AlertBook, AlertRecord, PageId};
pub use buzzer::{Buzzer, SysfsBuzzer, configure_buzzer};
pub use kind::{AlertKind, Segment};
pub use plan::{PlanEvent, PlanStep, TOTALITY_PAGE, totality_alerts, totality_plan};
pub use scheduler::{AlertScheduler, PendingPage};
