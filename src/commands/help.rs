//! Help output.

use anyhow::Result;

/// Run the help command for `command`, or general help when `None`.
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("check") | Some("c") => super::check::display_help(),
        Some("watch") | Some("w") => super::watch::display_help(),
        Some("buzz") | Some("b") => super::buzz::display_help(),
        Some(unknown) => {
            log_pipe!();
            log_warning!("Unknown command: {}", unknown);
            display_general_help();
        }
    }
    Ok(())
}

/// Display the usage summary with all commands and options
pub fn display_general_help() {
    log_version!();
    log_block_start!("Usage: umbrawatch [OPTIONS] [COMMAND]");
    log_block_start!("Commands:");
    log_indented!("check, c           Report the totality window (default)");
    log_indented!("watch, w           Schedule and sound the totality alerts");
    log_indented!("buzz, b <kind>     Play one alert to test the buzzer");
    log_indented!("help [COMMAND]     Show detailed help for a command");
    log_block_start!("Options:");
    log_indented!("--lon <degrees>    Observer longitude (check, watch)");
    log_indented!("--lat <degrees>    Observer latitude (check, watch)");
    log_indented!("--at <HH:MM:SS>    Act as if it were this UTC time");
    log_indented!("-c, --config <dir> Use a custom configuration directory");
    log_indented!("-l, --log <file>   Also write the log to a file");
    log_indented!("-d, --debug        Enable detailed debug output");
    log_indented!("-h, --help         Print help information");
    log_indented!("-V, --version      Print version information");
    log_end!();
}

pub fn display_version() {
    log_version!();
    log_end!();
}
