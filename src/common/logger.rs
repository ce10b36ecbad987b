//! Structured logging with box-drawing output.
//!
//! Every line goes through [`write_output`], which prints to stdout or, when
//! file logging is active, forwards the text (ANSI codes stripped) to a
//! dedicated writer thread. Logging can be switched off globally so tests
//! and the alert worker stay quiet.
//!
//! ## Conventions
//!
//! - `log_block_start!` opens a new conceptual block (`┃` spacer, then `┣ message`).
//! - `log_decorated!` continues a block (`┣ message`).
//! - `log_indented!` lists details under the previous line (`┃   message`).
//! - `log_pipe!` inserts a spacer before a semantic message.
//! - `log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!`
//!   carry a colored `[LEVEL]` tag.
//! - `log_error_exit!` closes the flow with `┗[ERROR]`.
//! - `log_version!` / `log_end!` frame a whole run.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Wall-clock prefix on every line; turned on by --debug
static TIMESTAMPS_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_CHANNEL: OnceLock<Option<Sender<LogMessage>>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Shape of a single log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Block,
    Decorated,
    Indented,
    Level(Level),
    ErrorExit,
}

/// Severity tag for the semantic macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Debug,
    Warning,
    Error,
    Critical,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "\x1b[32mINFO\x1b[0m",
            Level::Debug => "\x1b[32mDEBUG\x1b[0m",
            Level::Warning => "\x1b[33mWARNING\x1b[0m",
            Level::Error => "\x1b[31mERROR\x1b[0m",
            Level::Critical => "\x1b[31mCRITICAL\x1b[0m",
        }
    }
}

/// Main logging interface.
pub struct Log;

impl Log {
    /// Enable or disable all log output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Prefix each line with the current UTC time.
    pub fn set_timestamps(enabled: bool) {
        TIMESTAMPS_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Start file logging to the specified path.
    ///
    /// Output is routed to the file until the returned guard is dropped.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(Some(tx.clone()))
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::Builder::new()
            .name("log-writer".into())
            .spawn(move || {
                let mut file = std::fs::File::create(&file_path)?;
                loop {
                    match rx.recv() {
                        Ok(LogMessage::Formatted(text)) => file.write_all(text.as_bytes())?,
                        Ok(LogMessage::Shutdown) | Err(_) => {
                            file.flush()?;
                            break;
                        }
                    }
                }
                Ok::<(), anyhow::Error>(())
            })?;

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Timestamp prefix for the current line, empty unless enabled.
    pub fn get_timestamp_prefix() -> String {
        if TIMESTAMPS_ENABLED.load(Ordering::SeqCst) {
            format!("[{}] ", chrono::Utc::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }

    /// Render one message in the given style. Used by the macros.
    pub fn render(style: LineStyle, message: &str) -> String {
        let prefix = Self::get_timestamp_prefix();
        match style {
            LineStyle::Block => format!("{prefix}┃\n{prefix}┣ {message}\n"),
            LineStyle::Decorated => format!("{prefix}┣ {message}\n"),
            LineStyle::Indented => format!("{prefix}┃   {message}\n"),
            LineStyle::Level(level) => format!("{prefix}┣[{}] {message}\n", level.tag()),
            LineStyle::ErrorExit => format!(
                "{prefix}┃\n{prefix}┗[{}] {message}\n",
                Level::Error.tag()
            ),
        }
    }
}

/// Guard for file logging that flushes and stops the writer on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Route already formatted text to the active sink.
pub fn write_output(text: &str) {
    if let Some(Some(tx)) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

// # Logging Macros

#[doc(hidden)]
#[macro_export]
macro_rules! __log_styled {
    ($style:expr, $fmt:literal $($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let message = format!($fmt $($arg)*);
            $crate::common::logger::write_output(&Log::render($style, &message));
        }
    }};
    ($style:expr, $expr:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let message = format!("{}", $expr);
            $crate::common::logger::write_output(&Log::render($style, &message));
        }
    }};
}

/// Log a message that starts a new block.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => {
        $crate::__log_styled!($crate::common::logger::LineStyle::Block, $($arg)+)
    };
}

/// Log a message inside the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => {
        $crate::__log_styled!($crate::common::logger::LineStyle::Decorated, $($arg)+)
    };
}

/// Log an indented detail line.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => {
        $crate::__log_styled!($crate::common::logger::LineStyle::Indented, $($arg)+)
    };
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            $crate::common::logger::write_output(&format!("{prefix}┃\n"));
        }
    }};
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let version = env!("CARGO_PKG_VERSION");
            $crate::common::logger::write_output(&format!("{prefix}┏ umbrawatch v{version} ━━╸\n"));
        }
    }};
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            $crate::common::logger::write_output(&format!("{prefix}╹\n"));
        }
    }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::__log_styled!(
            $crate::common::logger::LineStyle::Level($crate::common::logger::Level::Info),
            $($arg)+
        )
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::__log_styled!(
            $crate::common::logger::LineStyle::Level($crate::common::logger::Level::Debug),
            $($arg)+
        )
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => {
        $crate::__log_styled!(
            $crate::common::logger::LineStyle::Level($crate::common::logger::Level::Warning),
            $($arg)+
        )
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::__log_styled!(
            $crate::common::logger::LineStyle::Level($crate::common::logger::Level::Error),
            $($arg)+
        )
    };
}

#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)+) => {
        $crate::__log_styled!(
            $crate::common::logger::LineStyle::Level($crate::common::logger::Level::Critical),
            $($arg)+
        )
    };
}

/// Log an error that ends the current flow.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => {
        $crate::__log_styled!($crate::common::logger::LineStyle::ErrorExit, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_codes() {
        let colored = format!("┣[{}] hello\n", Level::Warning.tag());
        assert_eq!(strip_ansi_codes(&colored), "┣[WARNING] hello\n");
        assert_eq!(strip_ansi_codes("plain \x1b text"), "plain \x1b text");
    }

    #[test]
    fn test_render_styles() {
        assert_eq!(Log::render(LineStyle::Decorated, "x"), "┣ x\n");
        assert_eq!(Log::render(LineStyle::Indented, "x"), "┃   x\n");
        assert_eq!(Log::render(LineStyle::Block, "x"), "┃\n┣ x\n");
        assert!(Log::render(LineStyle::ErrorExit, "x").starts_with("┃\n┗["));
    }
}
