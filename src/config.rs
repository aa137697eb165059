//! # Schedule defaults.
//!
//! Provides [`Config`], shared defaults for schedules built in one place.
//!
//! Config is used in two ways:
//! 1. **Option defaults**: `ScheduleOptions::with_defaults(&config)`
//! 2. **Bus sizing**: `Bus::from_config(&config)`
//!
//! ## Sentinel values
//! - `delay = 0s` → no delay configured
//! - `timeout = 0s` → no overall timeout
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Defaults applied to schedules created from this config.
///
/// ## Field semantics
/// - `delay`: constant delay before each call (`0s` = none)
/// - `timeout`: overall deadline for each run (`0s` = none)
/// - `bus_capacity`: event bus ring buffer size (min 1)
///
/// ## Notes
/// Fields are public; prefer the accessors to avoid sprinkling sentinel checks.
#[derive(Clone, Debug)]
pub struct Config {
    /// Default constant delay before each call.
    pub delay: Duration,

    /// Default overall run timeout.
    pub timeout: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe `Lagged`.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the default delay as an `Option`.
    #[inline]
    pub fn default_delay(&self) -> Option<Duration> {
        if self.delay == Duration::ZERO {
            None
        } else {
            Some(self.delay)
        }
    }

    /// Returns the default run timeout as an `Option`.
    #[inline]
    pub fn default_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `delay = 0s` (call immediately)
    /// - `timeout = 0s` (no deadline)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            timeout: Duration::ZERO,
            bus_capacity: 1024,
        }
    }
}
