//! # procwatch
//!
//! Terminal dashboard for live processes and system memory.
//!
//! Every few seconds the process table is rebuilt from `/proc/<pid>/status`
//! and memory counters are re-read from `/proc/meminfo`. The operator moves a
//! highlighted row with the arrow keys and can ask the selected process to
//! exit with `SIGTERM` after a confirmation prompt.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use procwatch::{App, Config};
//!
//! let mut app = App::new(Config::default());
//! app.run()?;
//! # Ok::<(), procwatch::MonitorError>(())
//! ```
//!
//! ## Modules
//!
//! - [`collectors`]: process and memory sampling
//! - [`scheduler`]: resample cadence
//! - [`state`]: selection and scrolling
//! - [`controller`]: key handling and the termination prompt
//! - [`ui`]: rendering
//! - [`app`]: the main loop

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

/// Debug logging and timing macros.
#[macro_use]
pub mod debug;

/// Error types.
pub mod error;

/// Core types.
pub mod types;

/// Process and memory collectors.
pub mod collectors;

/// Refresh scheduling.
pub mod scheduler;

/// Selection state.
pub mod state;

/// Key mapping.
pub mod input;

/// Process termination.
pub mod signal;

/// Interaction state machine.
pub mod controller;

/// Colors.
pub mod theme;

/// Rendering.
pub mod ui;

/// Configuration.
pub mod config;

/// Main loop.
pub mod app;

pub use app::{App, CrosstermKeys, KeySource};
pub use config::Config;
pub use controller::{InteractionController, Mode, TerminationOutcome};
pub use error::{MonitorError, Result};
pub use signal::{SigtermTerminator, Terminator};
pub use types::{Collector, MemorySample, ProcessRecord, Snapshot};
