//! File logging for FindView
//!
//! A process-global logger writing `[millis] [LEVEL] [MODULE] message` lines.
//! Errors the GUI only reports in the status bar always end up here too.

use crate::search::SearchOutcome;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use parking_lot::Mutex;
use std::sync::OnceLock;
use std::time::SystemTime;

/// Global logger instance
static LOGGER: OnceLock<Mutex<FindViewLogger>> = OnceLock::new();

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.pad(label)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Main logger struct
pub struct FindViewLogger {
    file: Option<File>,
    min_level: LogLevel,
}

impl FindViewLogger {
    fn new(min_level: LogLevel) -> Self {
        let log_path = Self::get_log_path();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true) // Start fresh each run
            .open(&log_path)
            .ok();

        Self { file, min_level }
    }

    /// `$XDG_STATE_HOME/findview.log`, then `~/.local/state`, then the temp dir
    pub fn get_log_path() -> PathBuf {
        let state_dir = std::env::var_os("XDG_STATE_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("state"))
            })
            .filter(|p| p.is_dir())
            .unwrap_or_else(std::env::temp_dir);
        state_dir.join("findview.log")
    }

    fn log(&mut self, level: LogLevel, module: &str, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        let entry = format_entry(timestamp, level, module, message);

        if let Some(ref mut file) = self.file {
            let _ = file.write_all(entry.as_bytes());
            let _ = file.flush();
        }
    }
}

fn format_entry(timestamp: u128, level: LogLevel, module: &str, message: &str) -> String {
    format!("[{:013}] [{:5}] [{}] {}\n", timestamp, level, module, message)
}

/// Initialize the global logger
pub fn init(min_level: LogLevel) {
    let _ = LOGGER.set(Mutex::new(FindViewLogger::new(min_level)));
}

fn log(level: LogLevel, module: &str, message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.lock().log(level, module, message);
    }
}

pub fn debug(module: &str, message: &str) {
    log(LogLevel::Debug, module, message);
}

pub fn info(module: &str, message: &str) {
    log(LogLevel::Info, module, message);
}

pub fn warn(module: &str, message: &str) {
    log(LogLevel::Warn, module, message);
}

pub fn error(module: &str, message: &str) {
    log(LogLevel::Error, module, message);
}

/// Log the argv about to be executed
pub fn log_query(program: &str, args: &[String], elevated: bool) {
    let msg = format!(
        "Running {}{} {}",
        if elevated { "(elevated) " } else { "" },
        program,
        args.join(" ")
    );
    info("QUERY", &msg);
}

/// Log how a background search ended
pub fn log_search_outcome(outcome: &SearchOutcome) {
    match outcome {
        SearchOutcome::Completed {
            parsed,
            elapsed,
            warnings,
        } => {
            info(
                "SEARCH",
                &format!(
                    "Completed in {:?}: {} found, {} materialized, {} warnings",
                    elapsed,
                    parsed.total,
                    parsed.entries.len(),
                    warnings.len()
                ),
            );
            for w in warnings.iter().take(20) {
                debug("SEARCH", &format!("find: {}", w));
            }
        }
        SearchOutcome::Failed(e) => error("SEARCH", &format!("Failed: {}", e)),
        SearchOutcome::Cancelled => info("SEARCH", "Cancelled by user"),
    }
}

/// Log a row action and its result
pub fn log_action(action: &str, count: usize, result: &crate::Result<()>) {
    match result {
        Ok(()) => info("ACTION", &format!("{} on {} item(s)", action, count)),
        Err(e) => error("ACTION", &format!("{} on {} item(s) failed: {}", action, count, e)),
    }
}

/// Flush the log file
pub fn flush() {
    if let Some(logger) = LOGGER.get() {
        if let Some(ref mut file) = logger.lock().file {
            let _ = file.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_layout() {
        let line = format_entry(42, LogLevel::Warn, "RUNNER", "hello");
        assert_eq!(line, "[0000000000042] [WARN ] [RUNNER] hello\n");
    }

    #[test]
    fn levels_parse_and_order() {
        assert_eq!("Debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Debug < LogLevel::Error);
    }

    #[test]
    fn log_path_is_named_after_app() {
        let path = FindViewLogger::get_log_path();
        assert_eq!(path.file_name().unwrap(), "findview.log");
    }
}
