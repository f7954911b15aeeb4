//! Refresh scheduling.
//!
//! Resampling runs on a fixed cadence, or immediately when forced, independent
//! of how often input is polled.

use std::time::{Duration, Instant};

/// Default resample cadence.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(3000);

/// When the last resample happened and whether one is requested now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSchedule {
    /// Instant of the last resample.
    pub last_update: Instant,
    /// Resample on the next check regardless of elapsed time.
    pub forced: bool,
}

impl RefreshSchedule {
    /// A schedule that triggers on the first check.
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self { last_update: now, forced: true }
    }

    /// Requests a resample on the next check.
    pub fn force(&mut self) {
        self.forced = true;
    }

    /// The schedule after a resample at `now`.
    #[must_use]
    pub fn mark_refreshed(self, now: Instant) -> Self {
        Self { last_update: now, forced: false }
    }
}

/// Decides whether a schedule is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshScheduler {
    interval: Duration,
}

impl RefreshScheduler {
    /// Creates a scheduler with the given cadence.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// The resample cadence.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True when `schedule` is forced or at least one interval old at `now`.
    ///
    /// A `now` earlier than `last_update` counts as zero elapsed time.
    #[must_use]
    pub fn should_refresh(&self, now: Instant, schedule: &RefreshSchedule) -> bool {
        schedule.forced || now.saturating_duration_since(schedule.last_update) >= self.interval
    }

    /// Time left until the schedule is due, zero if it already is.
    #[must_use]
    pub fn time_until_due(&self, now: Instant, schedule: &RefreshSchedule) -> Duration {
        if schedule.forced {
            return Duration::ZERO;
        }
        self.interval.saturating_sub(now.saturating_duration_since(schedule.last_update))
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_INTERVAL)
    }
}
