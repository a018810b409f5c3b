//! FindView - desktop search panel over `find`
//!
//! Builds a `find` invocation from a set of filters, runs it (optionally
//! elevated through `pkexec`) on a background thread, and shows the matches
//! in a sortable, filterable table.
//!
//! # Example
//!
//! ```no_run
//! use findview::{build_query, SearchCriteria, SystemRunner, CommandRunner, CancelToken, ExecMode};
//!
//! fn main() -> findview::Result<()> {
//!     let mut criteria = SearchCriteria::new("/var/log");
//!     criteria.empty_only = true;
//!
//!     let args = build_query(&criteria)?;
//!     let output = SystemRunner::new().run("find", &args, ExecMode::Normal, &CancelToken::new())?;
//!     for line in output.stdout.lines() {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```

#![cfg(unix)]

pub mod accounts;
pub mod actions;
pub mod error;
pub mod gui;
pub mod logging;
pub mod menu;
pub mod metadata;
pub mod query;
pub mod results;
pub mod runner;
pub mod search;

pub use accounts::AccountDirectory;
pub use error::{FindViewError, Result};
pub use metadata::{FoundEntry, FsMetadata, MetadataSource};
pub use query::{build_query, SearchCriteria};
pub use results::{Column, ResultTable, SortOrder};
pub use runner::{CancelToken, CommandOutput, CommandRunner, ExecMode, SystemRunner};
pub use search::{SearchController, SearchOutcome};

use chrono::{DateTime, Local};
use logging::LogLevel;
use std::path::PathBuf;
use std::time::Duration;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format bytes as a human-readable string (binary units)
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Format a timestamp as `dd.MM.yyyy hh:mm:ss`
pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format("%d.%m.%Y %H:%M:%S").to_string()
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Search program
    pub find_program: String,
    /// Privilege helper used for "search as root"
    pub elevate_program: String,
    /// Maximum rows materialized per search
    pub max_rows: usize,
    /// How often the runner checks the child for exit or cancellation
    pub poll_interval: Duration,
    /// Kill searches running longer than this
    pub timeout: Option<Duration>,
    /// Directory preselected in the panel
    pub start_directory: Option<PathBuf>,
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            find_program: "find".to_string(),
            elevate_program: "pkexec".to_string(),
            max_rows: results::DEFAULT_MAX_ROWS,
            poll_interval: Duration::from_millis(50),
            timeout: None,
            start_directory: None,
            log_level: LogLevel::Info,
        }
    }
}
