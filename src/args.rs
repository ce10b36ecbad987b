//! Command-line argument parsing.
//!
//! Global flags may appear anywhere on the command line; the first
//! positional argument selects the command. Running without a command is
//! the same as `check` at the configured location.

use crate::alert::AlertKind;
use crate::geo::Location;
use crate::time_source::parse_time_of_day;

/// Flags shared by every command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalOptions {
    pub debug_enabled: bool,
    pub config_dir: Option<String>,
    pub log_file: Option<String>,
    /// Pin the clock to this many seconds after UTC midnight.
    pub at: Option<i64>,
}

/// What the process should do.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Locate the observer inside the shadow path
    Check {
        options: GlobalOptions,
        location: Option<Location>,
    },
    /// Locate the observer, then schedule and sound the totality alerts
    Watch {
        options: GlobalOptions,
        location: Option<Location>,
    },
    /// Play one alert through the scheduler
    Buzz {
        options: GlobalOptions,
        kind: AlertKind,
    },
    /// Detailed help for one command, or general help
    Help { command: Option<String> },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to invalid arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

fn usage_error(message: &str) -> ParsedArgs {
    log_warning!("{}", message);
    ParsedArgs {
        action: CliAction::ShowHelpDueToError,
    }
}

fn parse_coordinate(value: Option<&String>, flag: &str, limit: f64) -> Result<f64, String> {
    let value = value.ok_or_else(|| format!("Missing value for {flag}"))?;
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v.abs() <= limit => Ok(v),
        _ => Err(format!(
            "Invalid value for {flag}: {value} (expected -{limit} to {limit})"
        )),
    }
}

impl ParsedArgs {
    /// Parse `args` (including the program name) into an action.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut options = GlobalOptions::default();
        let mut display_help = false;
        let mut display_version = false;
        let mut lon: Option<f64> = None;
        let mut lat: Option<f64> = None;
        let mut positionals: Vec<String> = Vec::new();

        let mut i = 0;
        while i < args_vec.len() {
            let arg = args_vec[i].as_str();
            match arg {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => options.debug_enabled = true,
                "--config" | "-c" => match args_vec.get(i + 1) {
                    Some(dir) if !dir.starts_with('-') => {
                        options.config_dir = Some(dir.clone());
                        i += 1;
                    }
                    _ => {
                        return usage_error(
                            "Missing directory for --config. Usage: --config <directory>",
                        );
                    }
                },
                "--log" | "-l" => match args_vec.get(i + 1) {
                    Some(file) if !file.starts_with('-') => {
                        options.log_file = Some(file.clone());
                        i += 1;
                    }
                    _ => return usage_error("Missing file for --log. Usage: --log <file>"),
                },
                "--at" => match args_vec.get(i + 1).map(|s| parse_time_of_day(s)) {
                    Some(Ok(seconds)) => {
                        options.at = Some(seconds);
                        i += 1;
                    }
                    Some(Err(e)) => return usage_error(&format!("Invalid --at time: {e}")),
                    None => return usage_error("Missing time for --at. Usage: --at HH:MM:SS"),
                },
                // negative longitudes look like flags, so the value is taken as-is
                "--lon" => {
                    match parse_coordinate(args_vec.get(i + 1), "--lon", 180.0) {
                        Ok(v) => lon = Some(v),
                        Err(e) => return usage_error(&e),
                    }
                    i += 1;
                }
                "--lat" => {
                    match parse_coordinate(args_vec.get(i + 1), "--lat", 90.0) {
                        Ok(v) => lat = Some(v),
                        Err(e) => return usage_error(&e),
                    }
                    i += 1;
                }
                _ if arg.starts_with('-') => {
                    return usage_error(&format!("Unknown option: {arg}"));
                }
                _ => positionals.push(arg.to_string()),
            }
            i += 1;
        }

        // Version takes precedence over help, like most tools
        if display_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if display_help {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }

        let location = match (lon, lat) {
            (Some(lon), Some(lat)) => Some(Location::new(lon, lat)),
            (None, None) => None,
            _ => return usage_error("--lon and --lat must be given together"),
        };

        let command = positionals.first().map(String::as_str).unwrap_or("check");
        let rest = positionals.get(1..).unwrap_or_default();

        match command {
            "check" | "c" | "watch" | "w" => {
                if let Some(extra) = rest.first() {
                    return usage_error(&format!("Unexpected argument for {command}: {extra}"));
                }
                let action = if command.starts_with('c') {
                    CliAction::Check { options, location }
                } else {
                    CliAction::Watch { options, location }
                };
                ParsedArgs { action }
            }
            "buzz" | "b" => {
                if location.is_some() {
                    return usage_error("--lon/--lat only apply to the check command");
                }
                let [kind] = rest else {
                    return usage_error(
                        "Expected one alert kind. Usage: umbrawatch buzz <none|notice|time|warning>",
                    );
                };
                match kind.parse::<AlertKind>() {
                    Ok(kind) => ParsedArgs {
                        action: CliAction::Buzz { options, kind },
                    },
                    Err(e) => usage_error(&e.to_string()),
                }
            }
            "help" => match rest {
                [] => ParsedArgs {
                    action: CliAction::Help { command: None },
                },
                [command] => ParsedArgs {
                    action: CliAction::Help {
                        command: Some(command.clone()),
                    },
                },
                _ => usage_error("Usage: umbrawatch help [COMMAND]"),
            },
            other => usage_error(&format!("Unknown command: {other}")),
        }
    }

    /// Parse the process's own arguments.
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::logger::Log;

    fn action(args: &[&str]) -> CliAction {
        Log::set_enabled(false);
        ParsedArgs::parse(std::iter::once("umbrawatch").chain(args.iter().copied())).action
    }

    #[test]
    fn test_parse_no_args_runs_check() {
        assert_eq!(
            action(&[]),
            CliAction::Check {
                options: GlobalOptions::default(),
                location: None,
            }
        );
    }

    #[test]
    fn test_parse_check_with_location() {
        assert_eq!(
            action(&["check", "--lon", "-89.2", "--lat", "37.7"]),
            CliAction::Check {
                options: GlobalOptions::default(),
                location: Some(Location::new(-89.2, 37.7)),
            }
        );
    }

    #[test]
    fn test_parse_global_flags_anywhere() {
        let expected_options = GlobalOptions {
            debug_enabled: true,
            config_dir: Some("/tmp/uw".to_string()),
            log_file: Some("run.log".to_string()),
            at: Some(18 * 3600 + 30),
        };
        assert_eq!(
            action(&[
                "--debug", "buzz", "--config", "/tmp/uw", "notice", "--log", "run.log", "--at",
                "18:00:30",
            ]),
            CliAction::Buzz {
                options: expected_options,
                kind: AlertKind::Notice,
            }
        );
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(action(&["--help"]), CliAction::ShowHelp);
        assert_eq!(action(&["-h"]), CliAction::ShowHelp);
        assert_eq!(action(&["help"]), CliAction::Help { command: None });
        assert_eq!(
            action(&["help", "buzz"]),
            CliAction::Help {
                command: Some("buzz".to_string())
            }
        );
        assert_eq!(action(&["--version"]), CliAction::ShowVersion);
        assert_eq!(action(&["-V", "--help"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_parse_errors() {
        let cases: [&[&str]; 13] = [
            &["--frobnicate"],
            &["launch"],
            &["buzz"],
            &["buzz", "siren"],
            &["buzz", "notice", "time"],
            &["check", "extra"],
            &["watch", "extra"],
            &["check", "--lon", "10.0"],
            &["check", "--lon", "200", "--lat", "0"],
            &["check", "--lat"],
            &["--config"],
            &["--at", "25:00:00"],
            &["buzz", "notice", "--lon", "1", "--lat", "1"],
        ];
        for args in cases {
            assert_eq!(
                action(args),
                CliAction::ShowHelpDueToError,
                "args {args:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_short_command_aliases() {
        assert!(matches!(action(&["c"]), CliAction::Check { .. }));
        assert!(matches!(action(&["w", "--at", "17:00:00"]), CliAction::Watch { .. }));
        assert!(matches!(
            action(&["b", "time"]),
            CliAction::Buzz {
                kind: AlertKind::Time,
                ..
            }
        ));
    }
}
