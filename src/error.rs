//! Error types for the process dashboard.
//!
//! Only failures that the main loop must react to are represented here.
//! Per-process read failures and per-field parse failures never surface as
//! errors: the first drops the record, the second defaults the field.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for dashboard operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The process enumeration root could not be opened.
    #[error("failed to enumerate processes under {}: {source}", root.display())]
    Enumeration {
        /// The directory that was enumerated.
        root: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The memory-info file could not be opened.
    #[error("failed to read memory info from {}: {source}", path.display())]
    MemorySample {
        /// The memory-info file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The OS rejected a termination request.
    #[error("failed to send SIGTERM to PID {pid}: {source}")]
    Termination {
        /// Target process.
        pid: u32,
        /// OS error returned by the signal call.
        source: io::Error,
    },

    /// The pid cannot be addressed by the platform signal API.
    #[error("PID {0} is not a valid signal target")]
    InvalidPid(u32),

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    ConfigInvalid {
        /// The configuration key with invalid value.
        key: String,
        /// Error message describing why the value is invalid.
        message: String,
    },

    /// Unknown theme or malformed theme color.
    #[error("theme error: {0}")]
    ThemeError(String),

    /// Terminal initialization or rendering error.
    #[error("terminal error: {0}")]
    TerminalError(#[from] io::Error),
}

impl MonitorError {
    /// Returns the OS error text for termination failures, or the full
    /// display string for everything else.
    #[must_use]
    pub fn os_message(&self) -> String {
        match self {
            Self::Termination { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
