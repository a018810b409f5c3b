//! Error types for FindView
//!
//! Validation, execution, and file-action failures share one enum so the
//! GUI and CLI can report them without guessing.

use thiserror::Error;

/// Main error type for FindView operations
#[derive(Error, Debug)]
pub enum FindViewError {
    #[error("Select the search directory.")]
    MissingDirectory,

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Search command failed (exit code {}): {stderr}", display_code(.code))]
    CommandFailed { code: Option<i32>, stderr: String },

    #[error("Authorization for elevated search was denied or dismissed")]
    ElevationDenied,

    #[error("Search timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Search worker crashed: {0}")]
    Worker(String),

    #[error("Search cancelled")]
    Cancelled,

    #[error("A search is already running")]
    Busy,

    #[error("Move to trash failed: {0}")]
    Trash(String),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("GUI error: {0}")]
    Gui(String),
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Result type alias for FindView operations
pub type Result<T> = std::result::Result<T, FindViewError>;

impl FindViewError {
    /// Build a `CommandFailed` from raw exit data, keeping only the first stderr lines
    pub fn command_failed(code: Option<i32>, stderr: &str) -> Self {
        let stderr = stderr
            .lines()
            .filter(|l| !l.trim().is_empty())
            .take(3)
            .collect::<Vec<_>>()
            .join("; ");
        FindViewError::CommandFailed { code, stderr }
    }

    /// Errors caused by the user's input rather than by the system
    pub fn is_user_error(&self) -> bool {
        matches!(self, FindViewError::MissingDirectory | FindViewError::Busy)
    }
}
