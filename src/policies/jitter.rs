//! # Jitter for computed delays.
//!
//! [`JitterPolicy`] randomizes a backoff delay so that many runs polling the same
//! resource do not wake up in lockstep.
//!
//! - [`JitterPolicy::None`] - exact delay
//! - [`JitterPolicy::Full`] - uniform in `[0, delay]`
//! - [`JitterPolicy::Equal`] - `delay/2 + uniform[0, delay/2]`

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact delay.
    #[default]
    None,

    /// Full jitter: uniform in `[0, delay]`.
    Full,

    /// Equal jitter: half the delay plus uniform `[0, delay/2]`.
    Equal,
}

impl JitterPolicy {
    /// Applies jitter to the given delay. Never exceeds `delay`.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return delay;
        }
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Full => Duration::from_millis(rand::rng().random_range(0..=ms)),
            JitterPolicy::Equal => {
                let half = ms / 2;
                let extra = rand::rng().random_range(0..=ms - half);
                Duration::from_millis(half + extra)
            }
        }
    }
}
