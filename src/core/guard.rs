//! # Timeout guard: one deadline per run.
//!
//! The guard is armed once when a run starts and never re-armed. It does not
//! own a timer of its own; instead every suspension of the run is bounded by the
//! deadline:
//!
//! ```text
//! suspend(delay):
//!   wake = now + delay
//!   deadline <  wake  → sleep until deadline → Err(TimeoutElapsed)
//!   deadline >= wake  → sleep until wake     → Ok(())
//!   delay == 0        → yield to the runtime once
//!
//! race(fut):            (pending async predicate)
//!   fut ready first / at the deadline → Ok(output)
//!   deadline strictly first           → Err(TimeoutElapsed)
//! ```
//!
//! ## Rules
//! - A unit-of-work call that has started is **never** raced; only the waits
//!   around it are.
//! - Sleep futures are owned by the awaiting frame, so every exit path of the
//!   run (settle, error, timeout) drops and thereby cancels them.
//! - A deadline that would overflow `Instant` is treated as "never".
//! - A zero timeout is a deadline at the arming instant: the first non-zero
//!   suspension fails, while a zero delay ties with it and still yields.

use std::{future::Future, time::Duration};

use tokio::{
    task,
    time::{self, Instant},
};

use crate::error::TimeoutElapsed;

/// Deadline bounding every suspension of one run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimeoutGuard {
    deadline: Option<Instant>,
    timeout: Duration,
}

impl TimeoutGuard {
    /// Arms the guard at the current instant. `None` yields an unarmed guard;
    /// `Some(ZERO)` puts the deadline at the current instant.
    pub(crate) fn arm(timeout: Option<Duration>) -> Self {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        Self {
            deadline,
            timeout: timeout.unwrap_or_default(),
        }
    }

    /// Suspends for `delay`, unless the deadline comes strictly earlier.
    pub(crate) async fn suspend(&self, delay: Duration) -> Result<(), TimeoutElapsed> {
        let wake = Instant::now().checked_add(delay);
        if let Some(deadline) = self.deadline {
            if wake.map_or(true, |wake| deadline < wake) {
                time::sleep_until(deadline).await;
                return Err(self.elapsed());
            }
        }

        match wake {
            _ if delay.is_zero() => task::yield_now().await,
            Some(wake) => time::sleep_until(wake).await,
            None => std::future::pending::<()>().await,
        }
        Ok(())
    }

    /// Awaits `fut`, failing if the deadline passes strictly before it completes.
    pub(crate) async fn race<F: Future>(&self, fut: F) -> Result<F::Output, TimeoutElapsed> {
        let Some(deadline) = self.deadline else {
            return Ok(fut.await);
        };
        tokio::select! {
            biased;
            out = fut => Ok(out),
            _ = time::sleep_until(deadline) => Err(self.elapsed()),
        }
    }

    fn elapsed(&self) -> TimeoutElapsed {
        TimeoutElapsed::new(self.timeout)
    }
}
