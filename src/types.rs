//! Core types for the dashboard.
//!
//! - [`ProcessRecord`]: one process as read from its status file
//! - [`Snapshot`]: an immutable, ordered set of records taken at one instant
//! - [`MemorySample`]: aggregate memory and swap counters in kibibytes
//! - [`Collector`]: trait for anything that produces one of the above

use super::error::Result;
use std::time::Instant;

/// Name shown when a process name cannot be read.
pub const NAME_PLACEHOLDER: &str = "?";

/// State shown when a process state cannot be read.
pub const STATE_PLACEHOLDER: char = '?';

/// A single process.
///
/// Fields that could not be parsed hold their placeholder values, so a record
/// is always displayable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pid: u32,
    name: String,
    state: char,
    resident_memory_kb: u64,
}

impl ProcessRecord {
    /// Creates a record. An empty `name` is replaced with [`NAME_PLACEHOLDER`].
    ///
    /// Returns `None` when `pid` is zero.
    #[must_use]
    pub fn new(pid: u32, name: impl Into<String>, state: char, resident_memory_kb: u64) -> Option<Self> {
        if pid == 0 {
            return None;
        }
        let mut name = name.into();
        if name.is_empty() {
            name = NAME_PLACEHOLDER.to_string();
        }
        Some(Self { pid, name, state, resident_memory_kb })
    }

    /// Process ID (always positive).
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Display name (never empty).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Single-character state code.
    #[must_use]
    pub fn state(&self) -> char {
        self.state
    }

    /// Resident set size in kibibytes.
    #[must_use]
    pub fn resident_memory_kb(&self) -> u64 {
        self.resident_memory_kb
    }
}

/// Records in enumeration order plus the instant they were taken.
///
/// The order is whatever the process root yielded. Selection indexes into it
/// positionally, so it is never sorted.
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: Vec<ProcessRecord>,
    taken_at: Instant,
}

impl Snapshot {
    /// Creates a snapshot stamped with the current instant.
    #[must_use]
    pub fn new(records: Vec<ProcessRecord>) -> Self {
        Self::with_timestamp(records, Instant::now())
    }

    /// Creates a snapshot with a specific timestamp.
    #[must_use]
    pub fn with_timestamp(records: Vec<ProcessRecord>, taken_at: Instant) -> Self {
        Self { records, taken_at }
    }

    /// The records in enumeration order.
    #[must_use]
    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    /// Record at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ProcessRecord> {
        self.records.get(index)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// When the snapshot was taken.
    #[must_use]
    pub fn taken_at(&self) -> Instant {
        self.taken_at
    }
}

/// System memory counters, all in kibibytes. Absent fields are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySample {
    /// `MemTotal`.
    pub mem_total_kb: u64,
    /// `MemFree`.
    pub mem_free_kb: u64,
    /// `MemAvailable`.
    pub mem_available_kb: u64,
    /// `Cached`.
    pub cached_kb: u64,
    /// `Buffers`.
    pub buffers_kb: u64,
    /// `SwapTotal`.
    pub swap_total_kb: u64,
    /// `SwapFree`.
    pub swap_free_kb: u64,
}

const KB_PER_MB: u64 = 1024;

impl MemorySample {
    /// True when no recognized counter was found (or all were zero).
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        *self == Self::default()
    }

    /// Total memory in MiB.
    #[must_use]
    pub fn total_mb(&self) -> u64 {
        self.mem_total_kb / KB_PER_MB
    }

    /// Free memory in MiB.
    #[must_use]
    pub fn free_mb(&self) -> u64 {
        self.mem_free_kb / KB_PER_MB
    }

    /// Available memory in MiB.
    #[must_use]
    pub fn available_mb(&self) -> u64 {
        self.mem_available_kb / KB_PER_MB
    }

    /// Page cache in MiB.
    #[must_use]
    pub fn cached_mb(&self) -> u64 {
        self.cached_kb / KB_PER_MB
    }

    /// Buffers in MiB.
    #[must_use]
    pub fn buffers_mb(&self) -> u64 {
        self.buffers_kb / KB_PER_MB
    }

    /// Total swap in MiB.
    #[must_use]
    pub fn swap_total_mb(&self) -> u64 {
        self.swap_total_kb / KB_PER_MB
    }

    /// `total - free - cached`, clamped at zero.
    #[must_use]
    pub fn used_mb(&self) -> u64 {
        self.total_mb().saturating_sub(self.free_mb()).saturating_sub(self.cached_mb())
    }

    /// `swap_total - swap_free`, clamped at zero.
    #[must_use]
    pub fn swap_used_mb(&self) -> u64 {
        self.swap_total_mb().saturating_sub(self.swap_free_kb / KB_PER_MB)
    }
}

/// A source of one kind of sample.
///
/// Implementations are synchronous: `collect` runs to completion before
/// control returns to the caller.
pub trait Collector {
    /// What one collection produces.
    type Output;

    /// Short identifier used in log lines.
    fn id(&self) -> &'static str;

    /// Takes one sample.
    ///
    /// # Errors
    ///
    /// Returns an error only when the source as a whole is unreadable.
    fn collect(&mut self) -> Result<Self::Output>;

    /// Whether the source exists on this system.
    fn is_available(&self) -> bool;

    /// Human-readable name.
    fn display_name(&self) -> &'static str {
        self.id()
    }
}
