// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data-driven retry policies for the Tripline report agent.
//!
//! One [`RetryPolicy`] value describes everything about a retry discipline:
//! attempt budget, backoff shape, and which errors are worth another try.
//! Call sites pick a policy and wrap their operation in [`RetryPolicy::run`];
//! nothing retries implicitly.

use std::future::Future;
use std::time::Duration;

use tracing::warn;
use tripline_core::TriplineError;

/// A bounded-attempt retry discipline with clamped exponential backoff.
///
/// The delay before attempt `n + 1` is `base * 2^(n-1)` clamped into
/// `[floor, ceiling]`. Errors rejected by the `retryable` predicate are
/// returned immediately, as is the last error once attempts run out.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: u32,
    base: Duration,
    floor: Duration,
    ceiling: Duration,
    retryable: fn(&TriplineError) -> bool,
}

impl RetryPolicy {
    /// Builds a policy from explicit parts. `attempts` counts total tries,
    /// not retries, and must be at least 1.
    pub fn new(
        attempts: u32,
        base: Duration,
        floor: Duration,
        ceiling: Duration,
        retryable: fn(&TriplineError) -> bool,
    ) -> Self {
        Self {
            attempts: attempts.max(1),
            base,
            floor,
            ceiling,
            retryable,
        }
    }

    /// Policy for trip store calls: 3 attempts, 4-10 s exponential backoff,
    /// connectivity-shaped store errors only.
    pub fn store() -> Self {
        Self::new(
            3,
            Duration::from_secs(1),
            Duration::from_secs(4),
            Duration::from_secs(10),
            TriplineError::is_transient,
        )
    }

    /// Policy for chat delivery calls: same budget and backoff, channel
    /// errors only.
    pub fn delivery() -> Self {
        Self::new(
            3,
            Duration::from_secs(1),
            Duration::from_secs(4),
            Duration::from_secs(10),
            TriplineError::is_channel,
        )
    }

    /// Policy for workbook writes: same budget and backoff, any error.
    /// File-system hiccups during save have no finer classification.
    pub fn report_io() -> Self {
        Self::new(
            3,
            Duration::from_secs(1),
            Duration::from_secs(4),
            Duration::from_secs(10),
            |_| true,
        )
    }

    /// Total tries this policy allows.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The sleep before the attempt following attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let exp = self.base.saturating_mul(1u32 << shift);
        exp.clamp(self.floor, self.ceiling)
    }

    /// Runs `op` under this policy, sleeping between failed attempts.
    ///
    /// `op` is re-invoked from scratch on every attempt; it must be safe to
    /// repeat (the store and delivery calls it wraps are all reads or
    /// idempotent sends).
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, TriplineError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TriplineError>>,
    {
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.attempts && (self.retryable)(&err) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max_attempts = self.attempts,
                        delay_secs = delay.as_secs(),
                        error = %err,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
