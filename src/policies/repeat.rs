//! # Repeat policies.
//!
//! [`Repeat`] decides whether a run performs another call.
//!
//! - [`Repeat::Once`] - a single unconditional call (the default; also `false`).
//! - [`Repeat::Forever`] - keep calling until the timeout stops the run (`true`).
//! - [`Repeat::Times`] - exactly `n` calls. `Times(0)` makes no call at all but
//!   still waits the configured delay once before settling.
//! - [`Repeat::Predicate`] - ask a predicate before every call, including the first.
//!
//! ## Choosing the right policy
//! ```text
//! Fire once after a delay       → Repeat::Once      + Delay::Constant
//! Every 500ms, three times      → Repeat::Times(3)  + Delay::Constant(500ms)
//! Until a job reports "done"    → Repeat::predicate(|last, _| not done(last))
//! Heartbeat until deadline      → Repeat::Forever   + timeout
//! ```
//!
//! `Once` and `Times(0)` are deliberately different: `Once` calls the unit of work
//! without consulting a policy, `Times(0)` never calls it.

use std::{fmt, future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt};

type SyncPredicate<T, E> = dyn Fn(Option<&T>, u64) -> Result<bool, E> + Send + Sync;
type AsyncPredicate<T, E> =
    dyn Fn(Option<&T>, u64) -> BoxFuture<'static, Result<bool, E>> + Send + Sync;

/// A caller-supplied "run again?" check, synchronous or asynchronous.
///
/// Both forms receive the value produced by the previous call (or `None` before
/// the first one) and the index of the iteration about to run. A failing
/// predicate aborts the run exactly like a failing call.
pub enum Predicate<T, E> {
    /// Evaluated inline.
    Sync(Arc<SyncPredicate<T, E>>),
    /// Returns a future; the run awaits it (racing the timeout guard).
    Async(Arc<AsyncPredicate<T, E>>),
}

/// Result of asking a policy whether to continue.
pub(crate) enum Verdict<E> {
    Ready(Result<bool, E>),
    Pending(BoxFuture<'static, Result<bool, E>>),
}

/// Policy deciding whether another iteration runs.
pub enum Repeat<T, E> {
    /// Single unconditional call.
    Once,
    /// Unbounded; only the timeout guard or an error ends the run.
    Forever,
    /// Exactly `n` calls, iterations `0..n`.
    Times(u64),
    /// Continue while the predicate returns `true`.
    Predicate(Predicate<T, E>),
}

impl<T, E> Repeat<T, E> {
    /// Infallible synchronous predicate.
    ///
    /// ```rust
    /// use taskloop::Repeat;
    ///
    /// // keep polling while the last status is not "completed"
    /// let repeat: Repeat<String, std::io::Error> =
    ///     Repeat::predicate(|last: Option<&String>, _| last.map_or(true, |s| s != "completed"));
    /// # let _ = repeat;
    /// ```
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(Option<&T>, u64) -> bool + Send + Sync + 'static,
    {
        Self::try_predicate(move |latest, i| Ok(f(latest, i)))
    }

    /// Fallible synchronous predicate.
    pub fn try_predicate<F>(f: F) -> Self
    where
        F: Fn(Option<&T>, u64) -> Result<bool, E> + Send + Sync + 'static,
    {
        Repeat::Predicate(Predicate::Sync(Arc::new(f)))
    }

    /// Infallible asynchronous predicate.
    ///
    /// The returned future must be `'static`: copy what it needs out of the
    /// borrowed value before the `async` block.
    pub fn predicate_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Option<&T>, u64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
        E: 'static,
    {
        Self::try_predicate_async(move |latest, i| f(latest, i).map(Ok))
    }

    /// Fallible asynchronous predicate.
    pub fn try_predicate_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Option<&T>, u64) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, E>> + Send + 'static,
    {
        Repeat::Predicate(Predicate::Async(Arc::new(
            move |latest: Option<&T>, i: u64| f(latest, i).boxed(),
        )))
    }

    /// Decides whether iteration `iteration` should run, given the previous value.
    ///
    /// Only looping policies reach this; the scheduler dispatches `Once` itself.
    /// Here `Once` evaluates like `Times(1)`.
    pub(crate) fn evaluate(&self, latest: Option<&T>, iteration: u64) -> Verdict<E> {
        match self {
            Repeat::Once => Verdict::Ready(Ok(iteration < 1)),
            Repeat::Forever => Verdict::Ready(Ok(true)),
            Repeat::Times(n) => Verdict::Ready(Ok(iteration < *n)),
            Repeat::Predicate(Predicate::Sync(f)) => Verdict::Ready(f(latest, iteration)),
            Repeat::Predicate(Predicate::Async(f)) => Verdict::Pending(f(latest, iteration)),
        }
    }
}

impl<T, E> Default for Repeat<T, E> {
    /// Returns [`Repeat::Once`].
    fn default() -> Self {
        Repeat::Once
    }
}

impl<T, E> Clone for Repeat<T, E> {
    fn clone(&self) -> Self {
        match self {
            Repeat::Once => Repeat::Once,
            Repeat::Forever => Repeat::Forever,
            Repeat::Times(n) => Repeat::Times(*n),
            Repeat::Predicate(Predicate::Sync(f)) => {
                Repeat::Predicate(Predicate::Sync(Arc::clone(f)))
            }
            Repeat::Predicate(Predicate::Async(f)) => {
                Repeat::Predicate(Predicate::Async(Arc::clone(f)))
            }
        }
    }
}

impl<T, E> fmt::Debug for Repeat<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repeat::Once => f.write_str("Once"),
            Repeat::Forever => f.write_str("Forever"),
            Repeat::Times(n) => f.debug_tuple("Times").field(n).finish(),
            Repeat::Predicate(Predicate::Sync(_)) => f.write_str("Predicate(sync)"),
            Repeat::Predicate(Predicate::Async(_)) => f.write_str("Predicate(async)"),
        }
    }
}

impl<T, E> From<bool> for Repeat<T, E> {
    /// `false` → [`Repeat::Once`], `true` → [`Repeat::Forever`].
    fn from(forever: bool) -> Self {
        if forever {
            Repeat::Forever
        } else {
            Repeat::Once
        }
    }
}

impl<T, E> From<u64> for Repeat<T, E> {
    fn from(n: u64) -> Self {
        Repeat::Times(n)
    }
}
