//! Wait Mechanisms
//!
//! Two bounded polling disciplines:
//!
//! - [`poll_attempts`]: attempt-bounded, used by the `wait_for_displayed` verb
//! - [`poll_until`]: deadline-bounded, used by the driver's visibility and
//!   clickability waits
//!
//! ## Toyota Way Application
//!
//! - **Heijunka**: Fixed polling intervals keep step timing predictable
//! - **Jidoka**: Every wait has a hard bound; nothing polls forever

use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default number of polls for `wait_for_displayed`
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default interval between `wait_for_displayed` polls (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Default driver-internal polling interval for element waits (50ms)
pub const DEFAULT_DRIVER_POLL_MS: u64 = 50;

/// Default driver-internal timeout for element waits (10 seconds)
pub const DEFAULT_ELEMENT_TIMEOUT_MS: u64 = 10_000;

/// Shortest sleep between `poll_until` probes
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

// =============================================================================
// POLL OPTIONS
// =============================================================================

/// Options for the attempt-bounded visibility poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollOptions {
    /// Maximum number of polls (0 is treated as 1)
    pub max_attempts: u32,
    /// Sleep between polls in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl PollOptions {
    /// Create new poll options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum number of polls
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Number of polls that will actually run
    #[must_use]
    pub const fn effective_attempts(&self) -> u32 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Worst-case time spent sleeping between polls
    #[must_use]
    pub const fn worst_case_sleep(&self) -> Duration {
        Duration::from_millis(
            self.poll_interval_ms
                .saturating_mul(self.effective_attempts() as u64 - 1),
        )
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Outcome of an attempt-bounded poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Check passed on the given 1-based attempt
    Satisfied {
        /// Attempt that succeeded
        attempt: u32,
    },
    /// Every attempt failed
    Exhausted {
        /// Attempts performed
        attempts: u32,
    },
}

impl PollOutcome {
    /// Whether the check eventually passed
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }
}

/// Run `check` up to `options.effective_attempts()` times.
///
/// Returns as soon as `check` yields `true`. Sleeps `poll_interval` between
/// attempts, never after the last one.
pub fn poll_attempts<F>(options: &PollOptions, mut check: F) -> PollOutcome
where
    F: FnMut(u32) -> bool,
{
    let attempts = options.effective_attempts();
    for attempt in 1..=attempts {
        if check(attempt) {
            return PollOutcome::Satisfied { attempt };
        }
        if attempt < attempts && options.poll_interval_ms > 0 {
            thread::sleep(options.poll_interval());
        }
    }
    PollOutcome::Exhausted { attempts }
}

/// Run `check` until it yields `Some`, or until `timeout` has elapsed.
///
/// `check` always runs at least once, so a zero timeout still performs one
/// probe. Errors returned by `check` stop the wait immediately. `interval` is
/// raised to [`MIN_POLL_INTERVAL`].
pub fn poll_until<T, E, F>(timeout: Duration, interval: Duration, mut check: F) -> Result<Option<T>, E>
where
    F: FnMut() -> Result<Option<T>, E>,
{
    let interval = interval.max(MIN_POLL_INTERVAL);
    let start = Instant::now();
    loop {
        if let Some(value) = check()? {
            return Ok(Some(value));
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(None);
        }
        thread::sleep(interval.min(timeout - elapsed));
    }
}
