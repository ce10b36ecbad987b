//! Small formatting and path helpers shared across modules.

use std::fmt;
use std::path::Path;

/// Hours, minutes, and seconds split out of a second count.
///
/// Used for displaying both seconds-of-day timestamps and durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hms {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Hms {
    pub fn from_seconds(total: i64) -> Self {
        let hours = total / 3600;
        Self {
            hours,
            minutes: total / 60 - hours * 60,
            seconds: total % 60,
        }
    }

    /// Clock style, e.g. `18:17:41` or ` 9:05:00`.
    pub fn time(&self) -> String {
        format!("{:>2}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }

    /// Compact duration, e.g. `2m42s`, `1h02m03s`, `7s`.
    pub fn duration(&self) -> String {
        let mut out = String::new();
        if self.hours != 0 {
            out.push_str(&format!("{}h", self.hours));
        }
        if self.hours != 0 {
            out.push_str(&format!("{:02}m", self.minutes));
        } else if self.minutes != 0 {
            out.push_str(&format!("{}m", self.minutes));
        }
        if self.hours != 0 || self.minutes != 0 {
            out.push_str(&format!("{:02}s", self.seconds));
        } else {
            out.push_str(&format!("{}s", self.seconds));
        }
        out
    }
}

impl fmt::Display for Hms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.time())
    }
}

/// Replace the home directory prefix with `~` for display.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}
