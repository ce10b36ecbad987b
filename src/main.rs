//! Entry point: parse the command line and hand off to a command.

use anyhow::Result;

use umbrawatch::args::{CliAction, GlobalOptions, ParsedArgs};
use umbrawatch::commands;
use umbrawatch::common::constants::EXIT_FAILURE;
use umbrawatch::common::logger::{Log, LoggerGuard};
use umbrawatch::config;
use umbrawatch::{log_end, log_error_exit, log_indented, log_pipe};

fn main() {
    if let Err(e) = run() {
        log_pipe!();
        log_error_exit!("{e}");
        for cause in e.chain().skip(1) {
            log_indented!("{cause}");
        }
        log_end!();
        std::process::exit(EXIT_FAILURE);
    }
}

fn run() -> Result<()> {
    let parsed_args = ParsedArgs::from_env();

    match parsed_args.action {
        CliAction::ShowVersion => {
            commands::help::display_version();
            Ok(())
        }
        CliAction::ShowHelp => {
            commands::help::display_general_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            commands::help::display_general_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Help { command } => commands::help::run_help_command(command.as_deref()),
        CliAction::Check { options, location } => {
            let _guard = prepare(&options)?;
            commands::check::handle_check_command(&options, location)
        }
        CliAction::Watch { options, location } => {
            let _guard = prepare(&options)?;
            commands::watch::handle_watch_command(&options, location)
        }
        CliAction::Buzz { options, kind } => {
            let _guard = prepare(&options)?;
            commands::buzz::handle_buzz_command(&options, kind)
        }
    }
}

/// Apply the global options. The returned guard flushes the log file.
fn prepare(options: &GlobalOptions) -> Result<Option<LoggerGuard>> {
    config::set_config_dir(options.config_dir.clone())?;

    let guard = match &options.log_file {
        Some(file) => {
            Log::set_timestamps(true);
            Some(Log::start_file_logging(file.clone())?)
        }
        None => None,
    };

    if options.debug_enabled {
        Log::set_timestamps(true);
    }
    umbrawatch::log_version!();
    Ok(guard)
}
