//! # umbrawatch
//!
//! Eclipse totality alerts for a moving observer.
//!
//! The library holds everything the `umbrawatch` binary does so it can be
//! tested directly; `main.rs` only dispatches the parsed command line.
//!
//! - **Shadow locator**: `umbra` loads the umbra shapes and answers whether,
//!   and when, a point is inside the path of totality
//! - **Alerts**: `alert` schedules time-stamped alerts on a worker thread and
//!   plays them on a buzzer
//! - **Clock**: `time_source` abstracts the current time for tests and
//!   rehearsals
//! - **Observer**: `geo` decides when a moving observer needs a new check
//! - **Infrastructure**: configuration, signal handling, logging, and the
//!   command handlers

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod common;

pub mod alert;
pub mod args;
pub mod commands;
pub mod config;
pub mod geo;
pub mod io;
pub mod time_source;
pub mod umbra;
