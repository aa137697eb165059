//! # Schedule options.
//!
//! Defines [`ScheduleOptions`], the configuration bundle that describes how a unit
//! of work is repeated: repeat policy, delay, overall timeout and an optional event bus.
//!
//! Options can be created:
//! - **Explicitly** with [`ScheduleOptions::new`] and the `with_*` builders
//! - **From config** with [`ScheduleOptions::with_defaults`]
//!
//! Options are read-only once handed to [`schedule`](crate::schedule).

use std::time::Duration;

use crate::{
    config::Config,
    events::Bus,
    policies::{Delay, Repeat},
};

/// Configuration of a schedule over values `T` and errors `E`.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use taskloop::{Config, Delay, Repeat, ScheduleOptions};
///
/// let opts: ScheduleOptions<u32, std::io::Error> = ScheduleOptions::new()
///     .with_repeat(Repeat::Times(3))
///     .with_delay(Duration::from_millis(500))
///     .with_timeout(Duration::from_secs(2));
/// assert_eq!(opts.timeout(), Some(Duration::from_secs(2)));
///
/// // Inherit from config: `0s` means "not configured".
/// let from_cfg: ScheduleOptions<u32, std::io::Error> =
///     ScheduleOptions::with_defaults(&Config::default());
/// assert!(from_cfg.delay().is_none());
/// assert!(from_cfg.timeout().is_none());
/// ```
pub struct ScheduleOptions<T, E> {
    repeat: Repeat<T, E>,
    delay: Option<Delay<T>>,
    timeout: Option<Duration>,
    bus: Option<Bus>,
}

impl<T, E> ScheduleOptions<T, E> {
    /// Single call, no delay, no timeout, no event bus.
    pub fn new() -> Self {
        Self {
            repeat: Repeat::Once,
            delay: None,
            timeout: None,
            bus: None,
        }
    }

    /// Options inheriting the delay and timeout defaults of `cfg`.
    pub fn with_defaults(cfg: &Config) -> Self {
        Self {
            delay: cfg.default_delay().map(Delay::Constant),
            timeout: cfg.default_timeout(),
            ..Self::new()
        }
    }

    /// Returns new options with the given repeat policy.
    pub fn with_repeat(mut self, repeat: impl Into<Repeat<T, E>>) -> Self {
        self.repeat = repeat.into();
        self
    }

    /// Returns new options with the given delay.
    pub fn with_delay(mut self, delay: impl Into<Delay<T>>) -> Self {
        self.delay = Some(delay.into());
        self
    }

    /// Returns new options with the given overall timeout (`None` disables it;
    /// zero expires at the first positive delay).
    pub fn with_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.timeout = timeout.into();
        self
    }

    /// Returns new options publishing run events to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Returns the repeat policy.
    pub fn repeat(&self) -> &Repeat<T, E> {
        &self.repeat
    }

    /// Returns the delay, if configured.
    pub fn delay(&self) -> Option<&Delay<T>> {
        self.delay.as_ref()
    }

    /// Returns the overall timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the event bus, if configured.
    pub fn bus(&self) -> Option<&Bus> {
        self.bus.as_ref()
    }
}

impl<T, E> Default for ScheduleOptions<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for ScheduleOptions<T, E> {
    fn clone(&self) -> Self {
        Self {
            repeat: self.repeat.clone(),
            delay: self.delay.clone(),
            timeout: self.timeout,
            bus: self.bus.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for ScheduleOptions<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleOptions")
            .field("repeat", &self.repeat)
            .field("delay", &self.delay)
            .field("timeout", &self.timeout)
            .field("bus", &self.bus.is_some())
            .finish()
    }
}
