//! # Exponential backoff as a delay source.
//!
//! [`BackoffPolicy`] computes the delay before iteration `n` as `first × factor^n`,
//! clamped to `max`, with jitter applied to the clamped value. The base is a pure
//! function of the iteration index, so jitter never feeds back into later delays.
//!
//! Plug it into a schedule with `ScheduleOptions::with_delay(policy)`.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use taskloop::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! assert_eq!(backoff.next(1), Duration::from_millis(200));
//! assert_eq!(backoff.next(10), Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Growth rule for delays between iterations.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay before iteration 0.
    pub first: Duration,
    /// Upper bound for the computed delay (before jitter).
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 100ms`, `factor = 2.0`, `max = 30s`, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Constant delay: `factor = 1.0`, no jitter.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Delay before the given iteration (0-indexed).
    ///
    /// Non-finite or negative intermediate values clamp to `max`.
    pub fn next(&self, iteration: u64) -> Duration {
        let exp = iteration.min(i32::MAX as u64) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if secs.is_finite() && secs >= 0.0 && secs <= self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        };
        self.jitter.apply(base)
    }
}
