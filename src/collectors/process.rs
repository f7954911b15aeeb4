//! Process snapshot collector.
//!
//! Enumerates `<root>/<pid>/status` (normally `/proc`) into a [`Snapshot`].
//!
//! Failures are handled in two tiers:
//!
//! - a status file that cannot be opened drops the process entirely (it most
//!   likely exited between enumeration and read);
//! - a status file that opens but lacks a field keeps the process with that
//!   field defaulted.

use crate::error::{MonitorError, Result};
use crate::types::{Collector, ProcessRecord, Snapshot, NAME_PLACEHOLDER, STATE_PLACEHOLDER};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Default process root on Linux.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Longest name kept from a status file, in characters.
pub const MAX_NAME_CHARS: usize = 127;

/// Fields read from one status file. `None` means not found or malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFields {
    /// `Name:` value.
    pub name: Option<String>,
    /// First non-whitespace character of `State:`.
    pub state: Option<char>,
    /// First integer token of `VmRSS:`.
    pub vm_rss_kb: Option<u64>,
}

impl StatusFields {
    /// True once every recognized field has been found.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.name.is_some() && self.state.is_some() && self.vm_rss_kb.is_some()
    }

    /// Feeds one line of a status file. Lines for already-found keys are ignored.
    pub fn feed_line(&mut self, line: &str) {
        let line = line.trim_start();

        if let Some(rest) = line.strip_prefix("Name:") {
            if self.name.is_none() {
                self.name = Some(rest.trim().chars().take(MAX_NAME_CHARS).collect());
            }
        } else if let Some(rest) = line.strip_prefix("State:") {
            if self.state.is_none() {
                self.state = rest.trim_start().chars().next();
            }
        } else if let Some(rest) = line.strip_prefix("VmRSS:") {
            if self.vm_rss_kb.is_none() {
                self.vm_rss_kb = leading_u64(rest);
            }
        }
    }

    /// Parses a whole status file body.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut fields = Self::default();
        for line in content.lines() {
            fields.feed_line(line);
            if fields.is_complete() {
                break;
            }
        }
        fields
    }

    /// Builds a record, substituting placeholders for missing fields.
    #[must_use]
    pub fn into_record(self, pid: u32) -> Option<ProcessRecord> {
        ProcessRecord::new(
            pid,
            self.name.unwrap_or_else(|| NAME_PLACEHOLDER.to_string()),
            self.state.unwrap_or(STATE_PLACEHOLDER),
            self.vm_rss_kb.unwrap_or(0),
        )
    }
}

/// Parses the first unsigned integer token, skipping leading whitespace.
fn leading_u64(s: &str) -> Option<u64> {
    let s = s.trim_start();
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse().ok()
}

/// Interprets a directory entry name as a pid.
///
/// Only non-empty, purely decimal, positive names qualify.
#[must_use]
pub fn parse_pid(name: &OsStr) -> Option<u32> {
    let name = name.to_str()?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse::<u32>().ok().filter(|&pid| pid > 0)
}

/// Collector for process snapshots.
#[derive(Debug, Clone)]
pub struct ProcessCollector {
    root: PathBuf,
}

impl ProcessCollector {
    /// Creates a collector over the default process root.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(DEFAULT_PROC_ROOT)
    }

    /// Creates a collector over an arbitrary process root.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The enumerated directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads one process. `None` when its status file cannot be opened.
    ///
    /// A read error after a successful open keeps whatever was parsed so far.
    fn read_record(&self, pid: u32) -> Option<ProcessRecord> {
        let path = self.root.join(pid.to_string()).join("status");
        let file = File::open(path).ok()?;
        let mut reader = BufReader::new(file);

        let mut fields = StatusFields::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            fields.feed_line(&String::from_utf8_lossy(&buf));
            if fields.is_complete() {
                break;
            }
        }

        fields.into_record(pid)
    }

    /// Enumerates the root and reads every candidate process.
    fn scan(&self) -> Result<Snapshot> {
        let dir = std::fs::read_dir(&self.root).map_err(|source| MonitorError::Enumeration {
            root: self.root.clone(),
            source,
        })?;

        let mut records = Vec::new();
        let mut dropped = 0usize;

        for entry in dir.flatten() {
            let Some(pid) = parse_pid(&entry.file_name()) else {
                continue;
            };
            match self.read_record(pid) {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }

        crate::debug!(
            "process",
            "scanned {}: {} records, {} dropped",
            self.root.display(),
            records.len(),
            dropped
        );

        Ok(Snapshot::new(records))
    }
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for ProcessCollector {
    type Output = Snapshot;

    fn id(&self) -> &'static str {
        "process"
    }

    fn collect(&mut self) -> Result<Snapshot> {
        crate::time_scope!("process", "collect");
        self.scan()
    }

    fn is_available(&self) -> bool {
        self.root.is_dir()
    }

    fn display_name(&self) -> &'static str {
        "Processes"
    }
}
