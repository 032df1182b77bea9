//! Retry timing for connecting to a keyboard that is not (yet) attached.
//!
//! When a focus change arrives while the keyboard is unplugged, the apply is
//! deferred and the connect is retried on later polls. [`RetryBackoff`]
//! spaces those retries out exponentially so an absent device is not
//! enumerated on every tick.

use std::time::{Duration, Instant};

use crate::controller::KeyboardController;
use crate::device::{self, DeviceChannel};

/// Backoff parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Wait after the first failure.
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Factor applied to the wait after each further failure.
    pub multiplier: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// Default growth and cap, with the first wait set to `initial_delay`.
    pub fn starting_at(initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            ..Self::default()
        }
    }
}

/// Exponential backoff state.
#[derive(Debug)]
pub struct RetryBackoff {
    policy: BackoffPolicy,
    next_delay: Duration,
    retry_at: Option<Instant>,
    failures: u32,
}

impl Default for RetryBackoff {
    fn default() -> Self {
        Self::new(BackoffPolicy::default())
    }
}

impl RetryBackoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            next_delay: policy.initial_delay,
            policy,
            retry_at: None,
            failures: 0,
        }
    }

    /// Whether an attempt is allowed at `now`.
    pub fn ready_at(&self, now: Instant) -> bool {
        self.retry_at.is_none_or(|at| now >= at)
    }

    pub fn ready(&self) -> bool {
        self.ready_at(Instant::now())
    }

    /// Record a failed attempt made at `now`. Returns the wait before the next one.
    pub fn record_failure_at(&mut self, now: Instant) -> Duration {
        let wait = self.next_delay;
        self.failures += 1;
        self.retry_at = Some(now + wait);

        let grown = wait.as_secs_f64() * self.policy.multiplier;
        self.next_delay = Duration::from_secs_f64(grown).min(self.policy.max_delay);
        wait
    }

    pub fn record_failure(&mut self) -> Duration {
        self.record_failure_at(Instant::now())
    }

    /// Clear all failure history; the next attempt is allowed immediately.
    pub fn reset(&mut self) {
        self.next_delay = self.policy.initial_delay;
        self.retry_at = None;
        self.failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Time until the next attempt is allowed (zero when ready).
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.retry_at
            .map_or(Duration::ZERO, |at| at.saturating_duration_since(now))
    }
}

/// Connect `controller` if the backoff allows it.
///
/// Returns `None` without touching the device while the backoff is still
/// running. Otherwise returns the connect result and updates the backoff.
pub fn try_connect<C: DeviceChannel>(
    backoff: &mut RetryBackoff,
    controller: &mut KeyboardController<C>,
) -> Option<device::Result<()>> {
    if !backoff.ready() {
        return None;
    }
    let result = controller.connect();
    match &result {
        Ok(()) => backoff.reset(),
        Err(e) => {
            let wait = backoff.record_failure();
            log::warn!(
                "keyboard unavailable: {e} (attempt {}, retry in {:.1}s)",
                backoff.failures(),
                wait.as_secs_f64()
            );
        }
    }
    Some(result)
}
