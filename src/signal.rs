//! Process termination.

use crate::error::{MonitorError, Result};

/// Delivers a graceful-termination request to a process.
pub trait Terminator {
    /// Asks `pid` to exit. The process may ignore or handle the request.
    ///
    /// # Errors
    ///
    /// Returns the OS error when the request is rejected.
    fn terminate(&mut self, pid: u32) -> Result<()>;
}

/// Sends `SIGTERM` through `kill(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigtermTerminator;

impl Terminator for SigtermTerminator {
    fn terminate(&mut self, pid: u32) -> Result<()> {
        send_sigterm(pid)
    }
}

/// Sends `SIGTERM` to exactly one process.
///
/// Pids that do not map to a single positive `pid_t` are rejected before the
/// syscall, since zero and negative values address process groups.
#[cfg(unix)]
pub fn send_sigterm(pid: u32) -> Result<()> {
    let target = libc::pid_t::try_from(pid)
        .ok()
        .filter(|&p| p > 0)
        .ok_or(MonitorError::InvalidPid(pid))?;

    // SAFETY: kill(2) takes plain integers and has no memory-safety
    // preconditions; `target` is a single positive pid.
    #[allow(unsafe_code)]
    let rc = unsafe { libc::kill(target, libc::SIGTERM) };

    if rc == 0 {
        Ok(())
    } else {
        Err(MonitorError::Termination { pid, source: std::io::Error::last_os_error() })
    }
}

/// Signals are unavailable on this platform.
#[cfg(not(unix))]
pub fn send_sigterm(pid: u32) -> Result<()> {
    Err(MonitorError::Termination {
        pid,
        source: std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "signal delivery is not supported on this platform",
        ),
    })
}
