//! Debug logging.
//!
//! Disabled by default. Enabled via `--debug` or `PROCWATCH_DEBUG=1`.
//! While the dashboard owns the terminal, stderr is hidden behind the
//! alternate screen, so the binary routes output to a file with
//! [`enable_to_file`].

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Environment variable that enables logging.
pub const ENV_DEBUG: &str = "PROCWATCH_DEBUG";

/// Global debug mode flag.
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Start time stored as millis since UNIX epoch (atomic-safe).
static START_TIME_MS: AtomicU64 = AtomicU64::new(0);

/// Log file; `None` means stderr.
static SINK: Mutex<Option<File>> = Mutex::new(None);

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Enables logging to stderr.
pub fn enable() {
    START_TIME_MS.store(now_ms(), Ordering::SeqCst);
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

/// Enables logging, appending to `path`.
///
/// # Errors
///
/// Returns the I/O error if the file cannot be opened; logging stays off.
pub fn enable_to_file(path: impl AsRef<Path>) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    if let Ok(mut sink) = SINK.lock() {
        *sink = Some(file);
    }
    enable();
    Ok(())
}

/// Disables logging and closes the log file.
pub fn disable() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
    if let Ok(mut sink) = SINK.lock() {
        *sink = None;
    }
}

/// Returns true if debug mode is enabled.
#[inline]
pub fn is_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// True if the environment asks for logging.
#[must_use]
pub fn requested_by_env() -> bool {
    std::env::var(ENV_DEBUG).is_ok_and(|v| matches!(v.trim(), "1" | "true" | "yes"))
}

/// Gets elapsed time since debug was enabled.
fn elapsed_ms() -> u64 {
    let start = START_TIME_MS.load(Ordering::Relaxed);
    if start == 0 {
        return 0;
    }
    now_ms().saturating_sub(start)
}

/// Debug log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Tracing entry/exit of functions
    Trace,
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    fn color_code(self) -> &'static str {
        match self {
            Level::Trace => "\x1b[90m", // Gray
            Level::Debug => "\x1b[36m", // Cyan
            Level::Info => "\x1b[32m",  // Green
            Level::Warn => "\x1b[33m",  // Yellow
            Level::Error => "\x1b[31m", // Red
        }
    }
}

/// Writes one record. Format: `[+0000ms] [LEVEL] [component] message`.
fn write_record(
    out: &mut dyn Write,
    colored: bool,
    elapsed: u64,
    level: Level,
    component: &str,
    message: &str,
) -> io::Result<()> {
    let (color, reset) = if colored { (level.color_code(), "\x1b[0m") } else { ("", "") };
    writeln!(
        out,
        "[+{:04}ms] {}[{:5}]{} [{}] {}",
        elapsed,
        color,
        level.as_str(),
        reset,
        component,
        message
    )
}

/// Logs a message if debug mode is enabled.
pub fn log(level: Level, component: &str, message: &str) {
    if !is_enabled() {
        return;
    }

    let elapsed = elapsed_ms();
    let Ok(mut sink) = SINK.lock() else {
        return;
    };

    let _ = match sink.as_mut() {
        Some(file) => write_record(file, false, elapsed, level, component, message),
        None => write_record(&mut io::stderr(), true, elapsed, level, component, message),
    };
}

/// Logs with format arguments.
#[macro_export]
macro_rules! debug_log {
    ($level:expr, $component:expr, $($arg:tt)*) => {
        if $crate::debug::is_enabled() {
            $crate::debug::log($level, $component, &format!($($arg)*));
        }
    };
}

/// Convenience macro for trace level.
#[macro_export]
macro_rules! trace {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Trace, $component, $($arg)*)
    };
}

/// Convenience macro for debug level.
#[macro_export]
macro_rules! debug {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Debug, $component, $($arg)*)
    };
}

/// Convenience macro for info level.
#[macro_export]
macro_rules! info {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Info, $component, $($arg)*)
    };
}

/// Convenience macro for warn level.
#[macro_export]
macro_rules! warn {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Warn, $component, $($arg)*)
    };
}

/// Convenience macro for error level.
#[macro_export]
macro_rules! error {
    ($component:expr, $($arg:tt)*) => {
        $crate::debug_log!($crate::debug::Level::Error, $component, $($arg)*)
    };
}

/// RAII guard for timing a scope.
pub struct TimingGuard {
    component: &'static str,
    operation: String,
    start: Instant,
}

impl TimingGuard {
    /// Creates a new timing guard.
    pub fn new(component: &'static str, operation: impl Into<String>) -> Self {
        let operation = operation.into();
        if is_enabled() {
            log(Level::Trace, component, &format!("-> {operation}"));
        }
        Self { component, operation, start: Instant::now() }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if is_enabled() {
            let elapsed = self.start.elapsed();
            log(
                Level::Trace,
                self.component,
                &format!("<- {} ({:.2}ms)", self.operation, elapsed.as_secs_f64() * 1000.0),
            );
        }
    }
}

/// Creates a timing guard for a scope.
#[macro_export]
macro_rules! time_scope {
    ($component:expr, $operation:expr) => {
        let _guard = $crate::debug::TimingGuard::new($component, $operation);
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(colored: bool, level: Level) -> String {
        let mut out = Vec::new();
        write_record(&mut out, colored, 42, level, "process", "scanned 3 entries").unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_plain_record_format() {
        assert_eq!(record(false, Level::Warn), "[+0042ms] [WARN ] [process] scanned 3 entries\n");
        assert_eq!(record(false, Level::Error), "[+0042ms] [ERROR] [process] scanned 3 entries\n");
    }

    #[test]
    fn test_colored_record_wraps_level() {
        let line = record(true, Level::Info);
        assert!(line.contains("\x1b[32m[INFO ]\x1b[0m"));
    }

    #[test]
    fn test_level_as_str() {
        assert_eq!(Level::Trace.as_str(), "TRACE");
        assert_eq!(Level::Debug.as_str(), "DEBUG");
        assert_eq!(Level::Info.as_str(), "INFO");
        assert_eq!(Level::Warn.as_str(), "WARN");
        assert_eq!(Level::Error.as_str(), "ERROR");
    }

    #[test]
    fn test_enable_to_file_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("procwatch.log");

        enable_to_file(&path).unwrap();
        assert!(is_enabled());
        log(Level::Info, "test", "hello");
        disable();

        assert!(path.exists());
    }

    #[test]
    fn test_enable_to_file_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(enable_to_file(dir.path().join("missing").join("x.log")).is_err());
    }

    #[test]
    fn test_timing_guard_when_disabled() {
        disable();
        {
            let _guard = TimingGuard::new("test", "noop");
        }
    }

    #[test]
    fn test_timing_guard_fields() {
        let guard = TimingGuard::new("drop_test", "test_operation");
        assert_eq!(guard.component, "drop_test");
        assert_eq!(guard.operation, "test_operation");
    }
}
