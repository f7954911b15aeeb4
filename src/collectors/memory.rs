//! System memory sampler.
//!
//! Parses `/proc/meminfo` style `Label: value [unit]` lines into a
//! [`MemorySample`].

use crate::error::{MonitorError, Result};
use crate::types::{Collector, MemorySample};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Default memory-info file on Linux.
pub const DEFAULT_MEMINFO_PATH: &str = "/proc/meminfo";

/// Parses meminfo content. Unrecognized labels are ignored, missing or
/// malformed values stay at zero, and a repeated label keeps its last value.
#[must_use]
pub fn parse_meminfo(content: &str) -> MemorySample {
    let mut sample = MemorySample::default();

    for line in content.lines() {
        let Some((label, rest)) = line.split_once(':') else {
            continue;
        };
        let Some(value) = rest.split_whitespace().next().and_then(|v| v.parse::<u64>().ok())
        else {
            continue;
        };

        let slot = match label.trim() {
            "MemTotal" => &mut sample.mem_total_kb,
            "MemFree" => &mut sample.mem_free_kb,
            "MemAvailable" => &mut sample.mem_available_kb,
            "Cached" => &mut sample.cached_kb,
            "Buffers" => &mut sample.buffers_kb,
            "SwapTotal" => &mut sample.swap_total_kb,
            "SwapFree" => &mut sample.swap_free_kb,
            _ => continue,
        };
        *slot = value;
    }

    sample
}

/// Collector for system memory samples.
#[derive(Debug, Clone)]
pub struct MemoryCollector {
    path: PathBuf,
}

impl MemoryCollector {
    /// Creates a collector over the default meminfo file.
    #[must_use]
    pub fn new() -> Self {
        Self::with_path(DEFAULT_MEMINFO_PATH)
    }

    /// Creates a collector over an arbitrary meminfo file.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The sampled file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the file.
    ///
    /// Fails only if the file cannot be opened. A read error after opening
    /// keeps whatever was read.
    pub fn sample(&self) -> Result<MemorySample> {
        let mut file = File::open(&self.path).map_err(|source| MonitorError::MemorySample {
            path: self.path.clone(),
            source,
        })?;

        let mut bytes = Vec::new();
        if let Err(e) = file.read_to_end(&mut bytes) {
            crate::warn!("memory", "partial read of {}: {}", self.path.display(), e);
        }

        Ok(parse_meminfo(&String::from_utf8_lossy(&bytes)))
    }
}

impl Default for MemoryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for MemoryCollector {
    type Output = MemorySample;

    fn id(&self) -> &'static str {
        "memory"
    }

    fn collect(&mut self) -> Result<MemorySample> {
        self.sample()
    }

    fn is_available(&self) -> bool {
        self.path.is_file()
    }

    fn display_name(&self) -> &'static str {
        "Memory"
    }
}
