//! Buzzer output and waveform playback.
//!
//! The buzzer is a plain on/off digital output. On the device it is a GPIO
//! line exported through sysfs; anything else implementing [`Buzzer`] works
//! too. A missing or misconfigured buzzer is not an error for the scheduler:
//! alerts still fire, silently.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use super::kind::AlertKind;
use crate::common::utils::private_path;

/// Binary output driving the buzzer.
#[cfg_attr(test, mockall::automock)]
pub trait Buzzer: Send {
    fn set(&mut self, on: bool) -> Result<()>;
}

/// GPIO line exported under `/sys/class/gpio/gpioN`.
pub struct SysfsBuzzer {
    value: PathBuf,
}

impl SysfsBuzzer {
    /// Configure the line as an output and drive it low.
    pub fn open(gpio_dir: &Path) -> Result<Self> {
        let direction = gpio_dir.join("direction");
        fs::write(&direction, "out").with_context(|| {
            format!(
                "Failed to set {} as an output",
                private_path(&direction)
            )
        })?;

        let mut buzzer = Self {
            value: gpio_dir.join("value"),
        };
        buzzer.set(false)?;
        Ok(buzzer)
    }
}

impl Buzzer for SysfsBuzzer {
    fn set(&mut self, on: bool) -> Result<()> {
        fs::write(&self.value, if on { "1" } else { "0" })
            .with_context(|| format!("Failed to write {}", private_path(&self.value)))
    }
}

/// Open the configured buzzer, logging and degrading to silence on failure.
pub fn configure_buzzer(gpio_dir: Option<&Path>) -> Option<Box<dyn Buzzer>> {
    let dir = gpio_dir?;
    match SysfsBuzzer::open(dir) {
        Ok(buzzer) => Some(Box::new(buzzer)),
        Err(e) => {
            log_pipe!();
            log_warning!("Could not configure buzzer output: {e:#}");
            log_indented!("Alerts will change pages without sound");
            None
        }
    }
}

/// Play the waveform for `kind`, blocking for its full length.
///
/// An output error stops playback for this alert; the line is then driven
/// low on a best-effort basis.
pub fn play(buzzer: &mut dyn Buzzer, kind: AlertKind) {
    if let Err(e) = drive(buzzer, kind) {
        log_error!("Buzzer error while playing {kind} alert: {e:#}");
        let _ = buzzer.set(false);
    }
}

fn drive(buzzer: &mut dyn Buzzer, kind: AlertKind) -> Result<()> {
    let waveform = kind.waveform();
    if waveform.is_empty() {
        return Ok(());
    }
    for segment in waveform {
        buzzer.set(segment.on)?;
        thread::sleep(Duration::from_millis(segment.millis));
    }
    if waveform.last().is_some_and(|s| s.on) {
        buzzer.set(false)?;
    }
    Ok(())
}

#[cfg(any(test, feature = "testing-support"))]
pub mod testing {
    //! In-memory buzzer that records every output change.

    use super::Buzzer;
    use anyhow::Result;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    /// Shared log of `(instant, level)` writes.
    pub type EdgeLog = Arc<Mutex<Vec<(Instant, bool)>>>;

    #[derive(Clone, Default)]
    pub struct RecordingBuzzer {
        edges: EdgeLog,
    }

    impl RecordingBuzzer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn edges(&self) -> EdgeLog {
            Arc::clone(&self.edges)
        }

        /// Output levels written so far, without timing.
        pub fn levels(&self) -> Vec<bool> {
            self.edges
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .iter()
                .map(|&(_, on)| on)
                .collect()
        }
    }

    impl Buzzer for RecordingBuzzer {
        fn set(&mut self, on: bool) -> Result<()> {
            self.edges
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((Instant::now(), on));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingBuzzer;
    use super::*;
    use crate::common::logger::Log;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use tempfile::tempdir;

    #[test]
    fn test_notice_levels() {
        let mut buzzer = RecordingBuzzer::new();
        play(&mut buzzer, AlertKind::Notice);
        assert_eq!(buzzer.levels(), vec![true, false, true, false]);
    }

    // Milliseconds between consecutive output writes
    fn edge_gaps(buzzer: &RecordingBuzzer) -> Vec<u128> {
        let edges = buzzer.edges();
        let edges = edges.lock().unwrap();
        edges
            .windows(2)
            .map(|pair| pair[1].0.duration_since(pair[0].0).as_millis())
            .collect()
    }

    fn assert_gaps(actual: &[u128], expected: &[u128]) {
        assert_eq!(actual.len(), expected.len(), "gaps {actual:?}");
        for (gap, want) in actual.iter().zip(expected) {
            assert!(
                (*want..*want + 80).contains(gap),
                "gap {gap} ms, expected about {want} ms in {actual:?}"
            );
        }
    }

    #[test]
    fn test_notice_timing() {
        let mut buzzer = RecordingBuzzer::new();
        play(&mut buzzer, AlertKind::Notice);
        assert_gaps(&edge_gaps(&buzzer), &[150, 150, 150]);
    }

    #[test]
    fn test_time_timing() {
        let mut buzzer = RecordingBuzzer::new();
        play(&mut buzzer, AlertKind::Time);
        assert_eq!(
            buzzer.levels(),
            vec![true, false, true, false, true, false, true, false]
        );
        assert_gaps(
            &edge_gaps(&buzzer),
            &[200, 800, 200, 800, 200, 800, 1000],
        );
    }

    #[test]
    fn test_none_is_silent() {
        let mut buzzer = MockBuzzer::new();
        buzzer.expect_set().never();
        play(&mut buzzer, AlertKind::None);
    }

    #[test]
    fn test_warning_sequence() {
        let mut buzzer = MockBuzzer::new();
        let mut seq = Sequence::new();
        buzzer
            .expect_set()
            .with(eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        buzzer
            .expect_set()
            .with(eq(false))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        play(&mut buzzer, AlertKind::Warning);
    }

    #[test]
    fn test_error_stops_playback_and_turns_off() {
        let mut buzzer = MockBuzzer::new();
        let mut seq = Sequence::new();
        buzzer
            .expect_set()
            .with(eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        // first off edge fails; playback must not continue to the second beep
        buzzer
            .expect_set()
            .with(eq(false))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(anyhow::anyhow!("line went away")));
        buzzer
            .expect_set()
            .with(eq(false))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        Log::set_enabled(false);
        play(&mut buzzer, AlertKind::Notice);
    }

    #[test]
    fn test_sysfs_buzzer_writes_direction_and_value() {
        let dir = tempdir().unwrap();
        let mut buzzer = SysfsBuzzer::open(dir.path()).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("direction")).unwrap(), "out");
        assert_eq!(fs::read_to_string(dir.path().join("value")).unwrap(), "0");

        buzzer.set(true).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("value")).unwrap(), "1");
    }

    #[test]
    fn test_configure_buzzer_degrades_on_failure() {
        Log::set_enabled(false);
        assert!(configure_buzzer(None).is_none());
        let missing = Path::new("/nonexistent/umbrawatch/gpio99");
        assert!(configure_buzzer(Some(missing)).is_none());
    }
}
