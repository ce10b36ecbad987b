//! Alert kinds and their buzzer waveforms.

use std::fmt;
use std::str::FromStr;

/// One step of a waveform: hold the output at `on` for `millis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub on: bool,
    pub millis: u64,
}

const fn on(millis: u64) -> Segment {
    Segment { on: true, millis }
}

const fn off(millis: u64) -> Segment {
    Segment { on: false, millis }
}

const NOTICE: &[Segment] = &[on(150), off(150), on(150)];

// Three short beeps counting down, then a long tone on the moment itself
const TIME: &[Segment] = &[
    on(200),
    off(800),
    on(200),
    off(800),
    on(200),
    off(800),
    on(1000),
];

const WARNING: &[Segment] = &[on(400)];

/// The audible signal attached to an alert record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlertKind {
    /// Page change only
    #[default]
    None,
    /// Two short beeps
    Notice,
    /// Countdown ending in a long tone
    Time,
    /// One medium beep
    Warning,
}

impl AlertKind {
    pub const ALL: [AlertKind; 4] = [
        AlertKind::None,
        AlertKind::Notice,
        AlertKind::Time,
        AlertKind::Warning,
    ];

    /// Output sequence played when an alert of this kind fires.
    pub fn waveform(self) -> &'static [Segment] {
        match self {
            AlertKind::None => &[],
            AlertKind::Notice => NOTICE,
            AlertKind::Time => TIME,
            AlertKind::Warning => WARNING,
        }
    }

    /// How far ahead of the record's time playback begins.
    ///
    /// For `Time` the long tone starts 100 ms before the record's time
    /// instead of the whole sequence finishing there.
    pub fn lead_time_ms(self) -> i64 {
        match self {
            AlertKind::None => 0,
            AlertKind::Notice => 450,
            AlertKind::Time => 3100,
            AlertKind::Warning => 400,
        }
    }

    /// Wall time the full waveform occupies.
    pub fn playback_ms(self) -> u64 {
        self.waveform().iter().map(|s| s.millis).sum()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::None => "none",
            AlertKind::Notice => "notice",
            AlertKind::Time => "time",
            AlertKind::Warning => "warning",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                anyhow::anyhow!("Unknown alert kind '{s}' (expected none, notice, time, or warning)")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_times_match_table() {
        assert_eq!(AlertKind::None.lead_time_ms(), 0);
        assert_eq!(AlertKind::Notice.lead_time_ms(), 450);
        assert_eq!(AlertKind::Time.lead_time_ms(), 3100);
        assert_eq!(AlertKind::Warning.lead_time_ms(), 400);
    }

    #[test]
    fn test_notice_waveform_totals_450ms() {
        assert_eq!(AlertKind::Notice.playback_ms(), 450);
        assert_eq!(
            AlertKind::Notice.playback_ms() as i64,
            AlertKind::Notice.lead_time_ms()
        );
    }

    #[test]
    fn test_time_waveform_long_tone_lands_on_target() {
        let waveform = AlertKind::Time.waveform();
        assert_eq!(waveform.iter().filter(|s| s.on).count(), 4);
        let last = waveform.last().unwrap();
        assert!(last.on);
        assert_eq!(last.millis, 1000);
        assert_eq!(AlertKind::Time.playback_ms(), 4000);
    }

    #[test]
    fn test_warning_and_none() {
        assert_eq!(AlertKind::Warning.waveform(), &[on(400)]);
        assert!(AlertKind::None.waveform().is_empty());
        assert_eq!(AlertKind::None.playback_ms(), 0);
    }

    #[test]
    fn test_waveforms_start_with_output_on() {
        for kind in AlertKind::ALL {
            if let Some(first) = kind.waveform().first() {
                assert!(first.on, "{kind} should start with the buzzer on");
            }
        }
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("Notice".parse::<AlertKind>().unwrap(), AlertKind::Notice);
        assert_eq!("time".parse::<AlertKind>().unwrap(), AlertKind::Time);
        assert!("siren".parse::<AlertKind>().is_err());
    }
}
