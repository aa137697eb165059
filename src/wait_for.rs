//! # Polling until a condition holds.
//!
//! [`wait_for()`] repeatedly asks an async completion check until it answers `true`,
//! waiting the configured delay between checks. It is a thin composition over
//! [`schedule`]: a no-op unit of work plus a repeat predicate that negates the check.
//!
//! ```text
//! iteration i:  is_complete(i) ─ true ─► Ok(())
//!                    │
//!                  false
//!                    ▼
//!               suspend(delay(i)) ─► no-op call ─► iteration i + 1
//! ```
//!
//! The check is called once per iteration, never concurrently with itself, and
//! starts with iteration `0` before any delay.
//!
//! ## Example
//! ```rust
//! use std::sync::{atomic::{AtomicBool, Ordering}, Arc};
//! use std::time::Duration;
//! use taskloop::wait_for;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ready = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&ready);
//! tokio::spawn(async move {
//!     tokio::time::sleep(Duration::from_millis(20)).await;
//!     flag.store(true, Ordering::SeqCst);
//! });
//!
//! let check = move |_| std::future::ready(ready.load(Ordering::SeqCst));
//! wait_for(check, Duration::from_millis(5), Duration::from_secs(1)).await.unwrap();
//! # }
//! ```

use std::{convert::Infallible, fmt, future::Future, sync::Arc, time::Duration};

use futures::{future, FutureExt};

use crate::{
    core::schedule,
    error::ScheduleError,
    policies::{BackoffPolicy, Delay, Repeat},
    work::{ScheduleOptions, WorkFn},
};

/// Wait between two completion checks, keyed on the iteration index.
pub enum PollDelay {
    /// Same duration every time.
    Constant(Duration),
    /// Computed from the index of the iteration about to run.
    Computed(Arc<dyn Fn(u64) -> Duration + Send + Sync>),
    /// Exponential growth keyed on the iteration index.
    Backoff(BackoffPolicy),
}

impl PollDelay {
    /// Wraps a closure as a computed poll delay.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(u64) -> Duration + Send + Sync + 'static,
    {
        PollDelay::Computed(Arc::new(f))
    }

    fn into_delay<T>(self) -> Delay<T> {
        match self {
            PollDelay::Constant(d) => Delay::Constant(d),
            PollDelay::Computed(f) => Delay::computed(move |_, i| f(i)),
            PollDelay::Backoff(policy) => Delay::Backoff(policy),
        }
    }
}

impl From<Duration> for PollDelay {
    fn from(d: Duration) -> Self {
        PollDelay::Constant(d)
    }
}

impl From<BackoffPolicy> for PollDelay {
    fn from(policy: BackoffPolicy) -> Self {
        PollDelay::Backoff(policy)
    }
}

impl fmt::Debug for PollDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollDelay::Constant(d) => f.debug_tuple("Constant").field(d).finish(),
            PollDelay::Computed(_) => f.write_str("Computed(..)"),
            PollDelay::Backoff(policy) => f.debug_tuple("Backoff").field(policy).finish(),
        }
    }
}

/// Resolves once `is_complete` returns `true`.
///
/// Fails only with [`ScheduleError::Timeout`] when `timeout` elapses first.
pub async fn wait_for<F, Fut>(
    is_complete: F,
    delay: impl Into<PollDelay>,
    timeout: impl Into<Option<Duration>>,
) -> Result<(), ScheduleError>
where
    F: Fn(u64) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    try_wait_for(
        move |i| is_complete(i).map(Ok::<bool, Infallible>),
        delay,
        timeout,
    )
    .await
}

/// Like [`wait_for()`], with a fallible check whose error aborts the wait.
pub async fn try_wait_for<F, Fut, E>(
    is_complete: F,
    delay: impl Into<PollDelay>,
    timeout: impl Into<Option<Duration>>,
) -> Result<(), ScheduleError<E>>
where
    F: Fn(u64) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, E>> + Send + 'static,
    E: Send + 'static,
{
    let delay: PollDelay = delay.into();
    let noop = WorkFn::new("wait_for", |()| future::ready(Ok::<(), E>(())));
    let options = ScheduleOptions::new()
        .with_repeat(Repeat::try_predicate_async(move |_: Option<&()>, i| {
            let check = is_complete(i);
            async move { check.await.map(|done| !done) }
        }))
        .with_delay(delay.into_delay::<()>())
        .with_timeout(timeout);

    schedule(noop, options).run().await.map(|_| ())
}
