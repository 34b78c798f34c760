//! Account-local pacing for arcade-pilot.
//!
//! Provides the timed pauses every backend step is followed by, the
//! human-readable rendering shown on the status board, and a bounded
//! exponential [`RetryPolicy`] for operations that used to retry forever.
//!
//! # Suspension model
//!
//! Every pause is a `tokio::time::sleep`, so it suspends only the account
//! worker that awaits it. Tests run with `tokio::time::pause()` and the
//! clock auto-advances, which makes even multi-hour cooldowns instant.

use std::time::Duration;

use rand::Rng;
use tokio::time;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Pauses
// ---------------------------------------------------------------------------

/// Logs `message` together with the pause length, then sleeps.
pub async fn pause(duration: Duration, message: &str) {
    info!(wait = %humanize(duration), "{message}");
    time::sleep(duration).await;
}

/// Pause given in milliseconds, the unit backend timings are quoted in.
pub async fn pause_ms(millis: u64, message: &str) {
    pause(Duration::from_millis(millis), message).await;
}

/// Renders a duration the way the status board shows it.
///
/// Sub-second values keep millisecond precision (`"600ms"`); longer ones
/// drop it and list non-zero units from hours down (`"1h 48m"`, `"2s"`).
pub fn humanize(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms == 0 {
        return "0s".to_string();
    }
    if total_ms < 1_000 {
        return format!("{total_ms}ms");
    }

    let secs = duration.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let mut parts = Vec::with_capacity(3);
    if h > 0 {
        parts.push(format!("{h}h"));
    }
    if m > 0 {
        parts.push(format!("{m}m"));
    }
    if s > 0 {
        parts.push(format!("{s}s"));
    }
    parts.join(" ")
}

// ---------------------------------------------------------------------------
// Retry policy
// ---------------------------------------------------------------------------

/// Bounded retry with exponential backoff and random jitter.
///
/// Attempt `n` (1-based) waits `base_delay * 2^(n-2)` before running,
/// capped at `max_delay`, plus up to `jitter` extra. The first attempt
/// runs immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Always at least 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound of the random extra added to each delay.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Clamp and fix any out-of-range values so the policy is safe to use.
    ///
    /// - `max_attempts` raised to 1.
    /// - `max_delay` raised to `base_delay`.
    pub fn validated(mut self) -> Self {
        self.max_attempts = self.max_attempts.max(1);
        if self.max_delay < self.base_delay {
            self.max_delay = self.base_delay;
        }
        self
    }

    /// The deterministic part of the delay after `failures` failed attempts.
    pub fn base_delay_after(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(failures - 1);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Delay after `failures` failed attempts, jitter included.
    pub fn delay_after(&self, failures: u32) -> Duration {
        let base = self.base_delay_after(failures);
        if base.is_zero() || self.jitter.is_zero() {
            return base;
        }
        let extra_us = rand::rng().random_range(0..=self.jitter.as_micros() as u64);
        base + Duration::from_micros(extra_us)
    }

    /// Starts a fresh attempt sequence.
    pub fn start(&self) -> Backoff {
        Backoff {
            policy: self.clone().validated(),
            attempt: 0,
        }
    }
}

/// A running attempt sequence.
///
/// ```ignore
/// let mut backoff = policy.start();
/// while let Some(attempt) = backoff.next_attempt().await {
///     match try_it().await {
///         Ok(v) => return Ok(v),
///         Err(e) => warn!(attempt, error = %e, "failed"),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: RetryPolicy,
    attempt: u32,
}

impl Backoff {
    /// Waits out the backoff delay and returns the next attempt number,
    /// or `None` once the policy is exhausted.
    pub async fn next_attempt(&mut self) -> Option<u32> {
        if self.attempt >= self.policy.max_attempts {
            return None;
        }
        if self.attempt > 0 {
            let delay = self.policy.delay_after(self.attempt);
            debug!(
                attempt = self.attempt + 1,
                max = self.policy.max_attempts,
                delay = %humanize(delay),
                "backing off before retry"
            );
            time::sleep(delay).await;
        }
        self.attempt += 1;
        Some(self.attempt)
    }

    /// Attempts started so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.policy.max_attempts
    }
}
