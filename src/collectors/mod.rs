//! Collectors for process and memory state.
//!
//! - **Process**: enumerates `/proc/<pid>/status` into a snapshot
//! - **Memory**: reads `/proc/meminfo` into a memory sample

pub mod memory;
pub mod process;

pub use memory::{parse_meminfo, MemoryCollector, DEFAULT_MEMINFO_PATH};
pub use process::{parse_pid, ProcessCollector, StatusFields, DEFAULT_PROC_ROOT};
