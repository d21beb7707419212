use std::time::Duration;

/// Converts a per-stage timeout and a fixed poll interval into an attempt ceiling.
///
/// Computes `floor(max_timeout_secs * 1000 / interval_ms)`. Inputs are expected to be
/// positive; a zero interval yields zero attempts instead of dividing by zero.
pub fn iteration_budget(max_timeout_secs: u64, interval_ms: u64) -> u64 {
    max_timeout_secs
        .saturating_mul(1000)
        .checked_div(interval_ms)
        .unwrap_or(0)
}

/// Parameters for one bounded poll loop.
///
/// The attempt count is fixed when the config is built; the loop never consults a clock,
/// so slow attempts stretch the wall-clock time past `max_timeout_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    max_timeout_secs: u64,
    interval_ms: u64,
    iterations: u64,
}

impl PollConfig {
    pub fn new(max_timeout_secs: u64, interval_ms: u64) -> Self {
        Self {
            max_timeout_secs,
            interval_ms,
            iterations: iteration_budget(max_timeout_secs, interval_ms),
        }
    }

    pub fn max_timeout_secs(&self) -> u64 {
        self.max_timeout_secs
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}
