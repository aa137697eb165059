//! Error types produced by scheduled runs.
//!
//! This module defines:
//!
//! - [`TimeoutElapsed`] - the synthetic error raised by the timeout guard. Its
//!   type is the stable discriminator checked by [`is_timeout_error`].
//! - [`ScheduleError`] - the outcome error of one run: either the guard fired,
//!   or the unit of work (or the repeat predicate) failed.
//!
//! Both types provide helper methods (`as_label`, ...) for logging/metrics.

use std::{convert::Infallible, error::Error as StdError, time::Duration};
use thiserror::Error;

/// The overall deadline of a run elapsed before the iteration chain settled.
///
/// Only the timeout guard constructs this value, so its presence anywhere in an
/// error's source chain identifies a schedule timeout regardless of message text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("schedule timed out after {timeout:?}")]
pub struct TimeoutElapsed {
    timeout: Duration,
}

impl TimeoutElapsed {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The configured overall timeout that was exceeded.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// # Errors produced by a scheduled run.
///
/// `E` is the error type of the unit of work. Predicate failures share it, so a
/// failing repeat predicate and a failing call look the same to the caller.
///
/// Defaults to [`Infallible`] for schedules that can only fail by timing out
/// (e.g. [`wait_for()`](crate::wait_for())).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ScheduleError<E = Infallible> {
    /// The timeout guard fired before the run settled.
    #[error("schedule timed out")]
    Timeout(#[source] TimeoutElapsed),

    /// The unit of work or the repeat predicate failed; the error is passed through unchanged.
    #[error(transparent)]
    Work(E),
}

impl<E> ScheduleError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskloop::ScheduleError;
    ///
    /// let err: ScheduleError<&str> = ScheduleError::Work("boom");
    /// assert_eq!(err.as_label(), "schedule_work_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ScheduleError::Timeout(_) => "schedule_timeout",
            ScheduleError::Work(_) => "schedule_work_failed",
        }
    }

    /// True if the run was terminated by the timeout guard.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScheduleError::Timeout(_))
    }

    /// Borrows the unit-of-work error, if this is one.
    pub fn work(&self) -> Option<&E> {
        match self {
            ScheduleError::Work(e) => Some(e),
            ScheduleError::Timeout(_) => None,
        }
    }

    /// Unwraps the unit-of-work error, if this is one.
    pub fn into_work(self) -> Option<E> {
        match self {
            ScheduleError::Work(e) => Some(e),
            ScheduleError::Timeout(_) => None,
        }
    }
}

impl<E> From<TimeoutElapsed> for ScheduleError<E> {
    fn from(e: TimeoutElapsed) -> Self {
        ScheduleError::Timeout(e)
    }
}

/// Returns `true` iff `error` (or anything in its source chain) was produced by
/// the timeout guard.
///
/// Matching is done on the [`TimeoutElapsed`] type, never on message text, so
/// unit-of-work errors that merely say "timed out" are not classified as
/// schedule timeouts.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use taskloop::{is_timeout_error, schedule, ScheduleOptions, WorkFn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let slow = schedule(
///     WorkFn::new("slow", |()| async { Ok::<_, std::io::Error>(()) }),
///     ScheduleOptions::new()
///         .with_delay(Duration::from_millis(50))
///         .with_timeout(Duration::from_millis(10)),
/// );
/// let err = slow.run().await.unwrap_err();
/// assert!(is_timeout_error(&err));
/// # }
/// ```
pub fn is_timeout_error(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        if err.is::<TimeoutElapsed>() {
            return true;
        }
        current = err.source();
    }
    false
}
