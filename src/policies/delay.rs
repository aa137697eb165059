//! # Delay resolution.
//!
//! [`Delay`] decides how long a run waits before each call:
//!
//! - [`Delay::Constant`] - the same duration every time;
//! - [`Delay::Computed`] - a function of the previous call's value (or `None`
//!   before the first call) and the index of the iteration about to run;
//! - [`Delay::Backoff`] - [`BackoffPolicy::next`] of the iteration index.
//!
//! The variant is fixed when the options are built; resolution never inspects
//! the shape of the configuration again.

use std::{fmt, sync::Arc, time::Duration};

use crate::policies::backoff::BackoffPolicy;

/// Signature of a computed delay: `(latest value, iteration) -> duration`.
pub type DelayFn<T> = dyn Fn(Option<&T>, u64) -> Duration + Send + Sync;

/// Wait applied before each call of the unit of work.
pub enum Delay<T> {
    /// Fixed duration, arguments ignored.
    Constant(Duration),
    /// Computed from the pre-iteration state.
    Computed(Arc<DelayFn<T>>),
    /// Exponential growth keyed on the iteration index.
    Backoff(BackoffPolicy),
}

impl<T> Delay<T> {
    /// Wraps a closure as a computed delay.
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use taskloop::Delay;
    ///
    /// let linear: Delay<()> = Delay::computed(|_, i| Duration::from_millis((i + 1) * 250));
    /// assert_eq!(linear.resolve(None, 3), Duration::from_secs(1));
    /// ```
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(Option<&T>, u64) -> Duration + Send + Sync + 'static,
    {
        Delay::Computed(Arc::new(f))
    }

    /// Concrete wait before `iteration`, given the value produced by the previous call.
    pub fn resolve(&self, latest: Option<&T>, iteration: u64) -> Duration {
        match self {
            Delay::Constant(d) => *d,
            Delay::Computed(f) => f(latest, iteration),
            Delay::Backoff(policy) => policy.next(iteration),
        }
    }
}

impl<T> Clone for Delay<T> {
    fn clone(&self) -> Self {
        match self {
            Delay::Constant(d) => Delay::Constant(*d),
            Delay::Computed(f) => Delay::Computed(Arc::clone(f)),
            Delay::Backoff(policy) => Delay::Backoff(*policy),
        }
    }
}

impl<T> fmt::Debug for Delay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delay::Constant(d) => f.debug_tuple("Constant").field(d).finish(),
            Delay::Computed(_) => f.write_str("Computed(..)"),
            Delay::Backoff(policy) => f.debug_tuple("Backoff").field(policy).finish(),
        }
    }
}

impl<T> From<Duration> for Delay<T> {
    fn from(d: Duration) -> Self {
        Delay::Constant(d)
    }
}

impl<T> From<BackoffPolicy> for Delay<T> {
    fn from(policy: BackoffPolicy) -> Self {
        Delay::Backoff(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_ignores_state() {
        let d: Delay<u32> = Duration::from_millis(200).into();
        assert_eq!(d.resolve(None, 0), Duration::from_millis(200));
        assert_eq!(d.resolve(Some(&7), 42), Duration::from_millis(200));
    }

    #[test]
    fn test_computed_sees_latest_value() {
        let d: Delay<u64> = Delay::computed(|latest, i| {
            Duration::from_millis(latest.copied().unwrap_or(0) * 10 + i)
        });
        assert_eq!(d.resolve(None, 0), Duration::ZERO);
        assert_eq!(d.resolve(Some(&5), 2), Duration::from_millis(52));
    }

    #[test]
    fn test_backoff_uses_iteration() {
        let d: Delay<()> = BackoffPolicy::default().into();
        assert_eq!(d.resolve(None, 0), Duration::from_millis(100));
        assert_eq!(d.resolve(None, 3), Duration::from_millis(800));
    }
}
