//! # Schedule: repeat a unit of work under a policy.
//!
//! [`schedule`] binds a [`Work`] to [`ScheduleOptions`] and returns a [`Schedule`].
//! Every [`Schedule::call`] starts an independent **run** with its own iteration
//! state and timeout guard; concurrent calls never share mutable state.
//!
//! ## Architecture
//! ```text
//! Schedule::call(args)
//!
//! arm TimeoutGuard (if timeout)
//! match repeat {
//!   Once      ─► [suspend(delay(None, 0))] ─► call ─► Ok(Some(value))
//!   Times(0)  ─► [suspend(delay(None, 0))] ─────────► Ok(None)
//!   otherwise ─► loop {
//!                  ├─► repeat.evaluate(latest, iteration)   (async: raced by guard)
//!                  │     └─ false ─► Ok(latest)
//!                  ├─► suspend(delay(latest, iteration))     (raced by guard)
//!                  ├─► call(args.clone())                     (never raced)
//!                  │     └─ Err(e) ─► Err(Work(e))
//!                  └─► latest = value; iteration += 1
//!                }
//! }
//! ```
//!
//! ## Rules
//! - Iterations run **sequentially**; iteration `k + 1` is not considered before call `k` settled
//! - The iteration counter **starts at 0** and is never reset within a run
//! - Errors are **never retried**; `repeat` only applies to successful calls
//! - A zero (or absent) delay inside the loop **yields** to the runtime instead of sleeping
//! - Each run returns **exactly one** outcome; timers are dropped with the run's frames

use std::{
    marker::PhantomData,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::{
    core::guard::TimeoutGuard,
    error::{ScheduleError, TimeoutElapsed},
    events::{Bus, Event, EventKind},
    policies::{Repeat, Verdict},
    work::{ScheduleOptions, Work},
};

/// Source of run ids (shared by all schedules in the process).
static RUN_SEQ: AtomicU64 = AtomicU64::new(1);

/// Outcome of one run: the latest value (`None` if the work never ran) or an error.
pub type RunResult<T, E> = Result<Option<T>, ScheduleError<E>>;

/// Binds `work` to `options`.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use taskloop::{schedule, Repeat, ScheduleOptions, WorkFn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let tick = schedule(
///     WorkFn::new("tick", |n: u32| async move { Ok::<_, std::io::Error>(n + 1) }),
///     ScheduleOptions::new()
///         .with_repeat(Repeat::Times(3))
///         .with_delay(Duration::from_millis(5)),
/// );
/// assert_eq!(tick.call(41).await.unwrap(), Some(42));
/// # }
/// ```
pub fn schedule<A, W>(work: W, options: ScheduleOptions<W::Output, W::Error>) -> Schedule<A, W>
where
    W: Work<A>,
{
    Schedule::new(work, options)
}

/// A unit of work bound to its options; call it to start a run.
///
/// Cheap to clone: clones share the work and the options.
pub struct Schedule<A, W>
where
    W: Work<A>,
{
    inner: Arc<Inner<W, W::Output, W::Error>>,
    _args: PhantomData<fn(A)>,
}

struct Inner<W, T, E> {
    work: W,
    name: Arc<str>,
    options: ScheduleOptions<T, E>,
}

/// Per-run iteration state, threaded by value through the loop.
struct RunState<T> {
    iteration: u64,
    latest: Option<T>,
}

impl<T> RunState<T> {
    fn new() -> Self {
        Self {
            iteration: 0,
            latest: None,
        }
    }

    fn advance(self, value: T) -> Self {
        Self {
            iteration: self.iteration + 1,
            latest: Some(value),
        }
    }
}

/// Event context of one run.
struct Run<'a> {
    id: u64,
    name: &'a Arc<str>,
    bus: Option<&'a Bus>,
}

impl Run<'_> {
    fn publish(&self, kind: EventKind, decorate: impl FnOnce(Event) -> Event) {
        if let Some(bus) = self.bus {
            let ev = Event::new(kind)
                .with_schedule(Arc::clone(self.name))
                .with_run(self.id);
            bus.publish(decorate(ev));
        }
    }

    fn timed_out<E>(&self, iteration: u64, e: TimeoutElapsed) -> ScheduleError<E> {
        self.publish(EventKind::TimeoutHit, |ev| {
            ev.with_iteration(iteration).with_timeout(e.timeout())
        });
        ScheduleError::Timeout(e)
    }
}

impl<A, W> Schedule<A, W>
where
    W: Work<A>,
{
    /// Creates a schedule; see [`schedule`].
    pub fn new(work: W, options: ScheduleOptions<W::Output, W::Error>) -> Self {
        let name = Arc::from(work.name());
        Self {
            inner: Arc::new(Inner {
                work,
                name,
                options,
            }),
            _args: PhantomData,
        }
    }

    /// Name of the underlying unit of work.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The options this schedule was built with.
    pub fn options(&self) -> &ScheduleOptions<W::Output, W::Error> {
        &self.inner.options
    }
}

impl<A, W> Schedule<A, W>
where
    W: Work<A>,
    A: Clone,
{
    /// Starts a fresh run with `args` and drives it to its single outcome.
    ///
    /// Each call of the unit of work receives a clone of `args`.
    pub async fn call(&self, args: A) -> RunResult<W::Output, W::Error> {
        let options = &self.inner.options;
        let run = Run {
            id: RUN_SEQ.fetch_add(1, Ordering::Relaxed),
            name: &self.inner.name,
            bus: options.bus(),
        };

        let guard = TimeoutGuard::arm(options.timeout());
        run.publish(EventKind::RunStarting, |ev| match options.timeout() {
            Some(t) => ev.with_timeout(t),
            None => ev,
        });

        let res = match options.repeat() {
            Repeat::Once => self.once(&run, &guard, args).await,
            Repeat::Times(0) => self.idle(&run, &guard).await,
            repeat => self.iterate(&run, &guard, repeat, args).await,
        };

        match &res {
            Ok(_) => run.publish(EventKind::RunCompleted, |ev| ev),
            Err(e) => run.publish(EventKind::RunFailed, |ev| ev.with_reason(e.as_label())),
        }
        res
    }

    /// Single unconditional call, optionally preceded by the delay for iteration 0.
    async fn once(
        &self,
        run: &Run<'_>,
        guard: &TimeoutGuard,
        args: A,
    ) -> RunResult<W::Output, W::Error> {
        if let Some(delay) = self.inner.options.delay() {
            self.suspend(run, guard, Some(delay.resolve(None, 0)), 0).await?;
        }
        self.invoke(run, args, 0).await.map(Some)
    }

    /// `Times(0)`: no call, but the configured delay is still waited once.
    async fn idle(&self, run: &Run<'_>, guard: &TimeoutGuard) -> RunResult<W::Output, W::Error> {
        if let Some(delay) = self.inner.options.delay() {
            self.suspend(run, guard, Some(delay.resolve(None, 0)), 0).await?;
        }
        Ok(None)
    }

    async fn iterate(
        &self,
        run: &Run<'_>,
        guard: &TimeoutGuard,
        repeat: &Repeat<W::Output, W::Error>,
        args: A,
    ) -> RunResult<W::Output, W::Error> {
        let mut state = RunState::new();

        loop {
            let verdict = repeat.evaluate(state.latest.as_ref(), state.iteration);
            let proceed = match verdict {
                Verdict::Ready(res) => res,
                Verdict::Pending(fut) => guard
                    .race(fut)
                    .await
                    .map_err(|e| run.timed_out::<W::Error>(state.iteration, e))?,
            };
            if !proceed.map_err(ScheduleError::Work)? {
                return Ok(state.latest);
            }

            let delay = self
                .inner
                .options
                .delay()
                .map(|d| d.resolve(state.latest.as_ref(), state.iteration));
            self.suspend(run, guard, delay, state.iteration).await?;

            let value = self.invoke(run, args.clone(), state.iteration).await?;
            state = state.advance(value);
        }
    }

    /// Waits before `iteration`. Without a configured delay this only yields and
    /// publishes nothing.
    async fn suspend(
        &self,
        run: &Run<'_>,
        guard: &TimeoutGuard,
        delay: Option<Duration>,
        iteration: u64,
    ) -> Result<(), ScheduleError<W::Error>> {
        if let Some(delay) = delay {
            run.publish(EventKind::DelayScheduled, |ev| {
                ev.with_iteration(iteration).with_delay(delay)
            });
        }
        guard
            .suspend(delay.unwrap_or_default())
            .await
            .map_err(|e| run.timed_out(iteration, e))
    }

    async fn invoke(
        &self,
        run: &Run<'_>,
        args: A,
        iteration: u64,
    ) -> Result<W::Output, ScheduleError<W::Error>> {
        run.publish(EventKind::IterationStarting, |ev| ev.with_iteration(iteration));
        match self.inner.work.call(args).await {
            Ok(value) => {
                run.publish(EventKind::IterationCompleted, |ev| {
                    ev.with_iteration(iteration)
                });
                Ok(value)
            }
            Err(e) => {
                run.publish(EventKind::IterationFailed, |ev| ev.with_iteration(iteration));
                Err(ScheduleError::Work(e))
            }
        }
    }
}

impl<W> Schedule<(), W>
where
    W: Work<()>,
{
    /// Starts a run of an argument-less schedule.
    pub async fn run(&self) -> RunResult<W::Output, W::Error> {
        self.call(()).await
    }
}

impl<A, W> Clone for Schedule<A, W>
where
    W: Work<A>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _args: PhantomData,
        }
    }
}

impl<A, W> std::fmt::Debug for Schedule<A, W>
where
    W: Work<A>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schedule")
            .field("name", &self.inner.name)
            .field("options", &self.inner.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{policies::Delay, work::WorkFn};
    use std::sync::Mutex;
    use thiserror::Error;
    use tokio::time::{self, Instant};

    #[derive(Error, Debug, PartialEq, Eq)]
    #[error("boom at call {0}")]
    struct Boom(u64);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn assert_elapsed(t0: Instant, want: u64) {
        let dt = t0.elapsed();
        assert!(
            dt >= ms(want) && dt < ms(want + 10),
            "elapsed {dt:?}, expected ~{want}ms"
        );
    }

    /// Returns the 1-based call number.
    fn counting(calls: &Arc<AtomicU64>) -> impl Work<(), Output = u64, Error = Boom> {
        let calls = Arc::clone(calls);
        WorkFn::new("counting", move |()| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok::<_, Boom>(n) }
        })
    }

    /// Sleeps `dur` inside the call, then returns the 1-based call number.
    fn slow(calls: &Arc<AtomicU64>, dur: Duration) -> impl Work<(), Output = u64, Error = Boom> {
        let calls = Arc::clone(calls);
        WorkFn::new("slow", move |()| {
            let calls = Arc::clone(&calls);
            async move {
                time::sleep(dur).await;
                Ok::<_, Boom>(calls.fetch_add(1, Ordering::SeqCst) + 1)
            }
        })
    }

    fn calls_of(calls: &Arc<AtomicU64>) -> u64 {
        calls.load(Ordering::SeqCst)
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_options_calls_once_without_waiting() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let res = schedule(counting(&calls), ScheduleOptions::new()).run().await;
        assert_eq!(res.unwrap(), Some(1));
        assert_eq!(calls_of(&calls), 1);
        assert_eq!(t0.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_once_with_constant_delay() {
        for repeat in [Repeat::<u64, Boom>::Once, Repeat::from(false)] {
            let calls = Arc::new(AtomicU64::new(0));
            let t0 = Instant::now();
            let opts = ScheduleOptions::new().with_repeat(repeat).with_delay(ms(200));
            let res = schedule(counting(&calls), opts).run().await;
            assert_eq!(res.unwrap(), Some(1));
            assert_eq!(calls_of(&calls), 1);
            assert_elapsed(t0, 200);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_once_computed_delay_sees_initial_state() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = Arc::clone(&seen);
        let calls = Arc::new(AtomicU64::new(0));
        let opts = ScheduleOptions::new().with_delay(Delay::computed(move |latest: Option<&u64>, i| {
            seen_in.lock().unwrap().push((latest.copied(), i));
            ms(50)
        }));
        schedule(counting(&calls), opts).run().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(None, 0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_zero_waits_delay_without_calling() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Times(0))
            .with_delay(ms(200));
        let res = schedule(counting(&calls), opts).run().await;
        assert_eq!(res.unwrap(), None);
        assert_eq!(calls_of(&calls), 0);
        assert_elapsed(t0, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_zero_without_delay_settles_immediately() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new().with_repeat(Repeat::Times(0));
        let res = schedule(counting(&calls), opts).run().await;
        assert_eq!(res.unwrap(), None);
        assert_eq!(calls_of(&calls), 0);
        assert_eq!(t0.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_three_constant_delay() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Times(3))
            .with_delay(ms(500));
        let res = schedule(counting(&calls), opts).run().await;
        assert_eq!(res.unwrap(), Some(3));
        assert_eq!(calls_of(&calls), 3);
        assert_elapsed(t0, 1500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_before_first_delay_elapses() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Times(3))
            .with_delay(ms(500))
            .with_timeout(ms(300));
        let err = schedule(counting(&calls), opts).run().await.unwrap_err();
        assert!(err.is_timeout());
        assert!(crate::is_timeout_error(&err));
        assert_eq!(calls_of(&calls), 0);
        assert_elapsed(t0, 300);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_fails_at_first_delay() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Times(3))
            .with_delay(ms(100))
            .with_timeout(Duration::ZERO);
        let err = schedule(counting(&calls), opts).run().await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(calls_of(&calls), 0);
        assert_eq!(t0.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_calls_that_already_ran() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Times(3))
            .with_delay(ms(200))
            .with_timeout(ms(500));
        let err = schedule(counting(&calls), opts).run().await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(calls_of(&calls), 2);
        assert_elapsed(t0, 500);

        // nothing starts after the deadline
        time::sleep(ms(1000)).await;
        assert_eq!(calls_of(&calls), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_not_reached() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Times(3))
            .with_delay(ms(200))
            .with_timeout(ms(1000));
        let res = schedule(counting(&calls), opts).run().await;
        assert_eq!(res.unwrap(), Some(3));
        assert_elapsed(t0, 600);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_three_linear_delay() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Times(3))
            .with_delay(Delay::computed(|_, i| ms((i + 1) * 200)));
        schedule(counting(&calls), opts).run().await.unwrap();
        assert_eq!(calls_of(&calls), 3);
        assert_elapsed(t0, 1200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_below_pi_linear_delay() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::predicate(|_, i| (i as f64) < std::f64::consts::PI))
            .with_delay(Delay::computed(|_, i| ms((i + 1) * 250)));
        let res = schedule(counting(&calls), opts).run().await;
        assert_eq!(res.unwrap(), Some(4));
        assert_eq!(calls_of(&calls), 4);
        assert_elapsed(t0, 2500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_status_completed() {
        let polls = Arc::new(AtomicU64::new(0));
        let polls_in = Arc::clone(&polls);
        let poll = WorkFn::new("poll", move |()| {
            let k = polls_in.fetch_add(1, Ordering::SeqCst);
            async move {
                let status = if k < 3 { "pending" } else { "completed" };
                Ok::<_, Boom>(status)
            }
        });

        let t0 = Instant::now();
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::predicate(|last: Option<&&str>, _| {
                last != Some(&"completed")
            }))
            .with_delay(ms(200));
        let res = schedule(poll, opts).run().await;
        assert_eq!(res.unwrap(), Some("completed"));
        assert_eq!(polls.load(Ordering::SeqCst), 4);
        assert_elapsed(t0, 800);
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_sees_previous_result_once_per_iteration() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = Arc::clone(&seen);
        let calls = Arc::new(AtomicU64::new(0));
        let opts = ScheduleOptions::new().with_repeat(Repeat::predicate(move |latest: Option<&u64>, i| {
            seen_in.lock().unwrap().push((latest.copied(), i));
            i < 3
        }));
        let res = schedule(counting(&calls), opts).run().await;
        assert_eq!(res.unwrap(), Some(3));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(None, 0), (Some(1), 1), (Some(2), 2), (Some(3), 3)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_computed_delay_sees_previous_result_in_loop() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in = Arc::clone(&seen);
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Times(3))
            .with_delay(Delay::computed(move |latest: Option<&u64>, i| {
                seen_in.lock().unwrap().push((latest.copied(), i));
                ms(10)
            }));
        let res = schedule(counting(&calls), opts).run().await;
        assert_eq!(res.unwrap(), Some(3));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(None, 0), (Some(1), 1), (Some(2), 2)]
        );
        assert_elapsed(t0, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_false_first_returns_absent() {
        let calls = Arc::new(AtomicU64::new(0));
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::predicate(|_, _| false))
            .with_delay(ms(100));
        let t0 = Instant::now();
        let res = schedule(counting(&calls), opts).run().await;
        assert_eq!(res.unwrap(), None);
        assert_eq!(calls_of(&calls), 0);
        assert_eq!(t0.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_work_error_stops_the_chain() {
        let calls = Arc::new(AtomicU64::new(0));
        let calls_in = Arc::clone(&calls);
        let flaky = WorkFn::new("flaky", move |()| {
            let n = calls_in.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 2 {
                    Err(Boom(n))
                } else {
                    Ok(n)
                }
            }
        });
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Forever)
            .with_delay(ms(10));
        let err = schedule(flaky, opts).run().await.unwrap_err();
        assert!(!err.is_timeout());
        assert_eq!(err.into_work(), Some(Boom(2)));

        time::sleep(ms(100)).await;
        assert_eq!(calls_of(&calls), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_predicate_error_aborts() {
        let calls = Arc::new(AtomicU64::new(0));
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::try_predicate(|latest: Option<&u64>, _| match latest {
                Some(&n) => Err(Boom(n)),
                None => Ok(true),
            }))
            .with_delay(ms(10));
        let err = schedule(counting(&calls), opts).run().await.unwrap_err();
        assert_eq!(err.into_work(), Some(Boom(1)));
        assert_eq!(calls_of(&calls), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_predicate_error_aborts() {
        let calls = Arc::new(AtomicU64::new(0));
        let opts = ScheduleOptions::new().with_repeat(Repeat::try_predicate_async(
            |_: Option<&u64>, i| async move {
                if i == 2 {
                    Err(Boom(i))
                } else {
                    Ok(true)
                }
            },
        ));
        let err = schedule(counting(&calls), opts).run().await.unwrap_err();
        assert_eq!(err.into_work(), Some(Boom(2)));
        assert_eq!(calls_of(&calls), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_async_predicate_is_preempted() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::predicate_async(|_, _| async {
                time::sleep(Duration::from_secs(5)).await;
                true
            }))
            .with_timeout(ms(200));
        let err = schedule(counting(&calls), opts).run().await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(calls_of(&calls), 0);
        assert_elapsed(t0, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_call_is_not_aborted() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new().with_timeout(ms(100));
        let res = schedule(slow(&calls, ms(500)), opts).run().await;
        assert_eq!(res.unwrap(), Some(1));
        assert_elapsed(t0, 500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_passed_during_call_stops_next_iteration() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Times(2))
            .with_timeout(ms(100));
        let err = schedule(slow(&calls, ms(300)), opts).run().await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(calls_of(&calls), 1);
        assert_elapsed(t0, 300);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forever_is_bounded_by_timeout() {
        let calls = Arc::new(AtomicU64::new(0));
        let t0 = Instant::now();
        let opts = ScheduleOptions::new()
            .with_repeat(true)
            .with_delay(ms(100))
            .with_timeout(ms(450));
        let err = schedule(counting(&calls), opts).run().await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(calls_of(&calls), 4);
        assert_elapsed(t0, 450);
    }

    #[tokio::test]
    async fn test_forever_without_delay_yields_and_times_out() {
        let calls = Arc::new(AtomicU64::new(0));
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Forever)
            .with_timeout(ms(20));
        let err = schedule(counting(&calls), opts).run().await.unwrap_err();
        assert!(err.is_timeout());
        assert!(calls_of(&calls) > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_runs_are_independent() {
        let calls = Arc::new(AtomicU64::new(0));
        let calls_in = Arc::clone(&calls);
        let echo = WorkFn::new("echo", move |x: u64| {
            calls_in.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, Boom>(x * 10) }
        });
        let sched = schedule(
            echo,
            ScheduleOptions::new()
                .with_repeat(Repeat::Times(2))
                .with_delay(ms(100)),
        );

        let t0 = Instant::now();
        let (a, b) = tokio::join!(sched.call(1), sched.call(2));
        assert_eq!(a.unwrap(), Some(10));
        assert_eq!(b.unwrap(), Some(20));
        assert_eq!(calls_of(&calls), 4);
        assert_elapsed(t0, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_can_be_spawned() {
        let calls = Arc::new(AtomicU64::new(0));
        let sched = schedule(
            counting(&calls),
            ScheduleOptions::new()
                .with_repeat(Repeat::Times(2))
                .with_delay(ms(10)),
        );
        let handle = tokio::spawn({
            let sched = sched.clone();
            async move { sched.run().await }
        });
        assert_eq!(handle.await.unwrap().unwrap(), Some(2));
        assert_eq!(sched.name(), "counting");
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_for_successful_run() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let calls = Arc::new(AtomicU64::new(0));
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Times(2))
            .with_delay(ms(10))
            .with_bus(bus);
        schedule(counting(&calls), opts).run().await.unwrap();

        let events = drain(&mut rx);
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::RunStarting,
                EventKind::DelayScheduled,
                EventKind::IterationStarting,
                EventKind::IterationCompleted,
                EventKind::DelayScheduled,
                EventKind::IterationStarting,
                EventKind::IterationCompleted,
                EventKind::RunCompleted,
            ]
        );
        let run = events[0].run;
        assert!(run.is_some());
        assert!(events.iter().all(|e| e.run == run));
        assert!(events.iter().all(|e| e.schedule.as_deref() == Some("counting")));
        assert_eq!(events[4].iteration, Some(1));
        assert_eq!(events[4].delay_ms, Some(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_events_without_a_delay() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let calls = Arc::new(AtomicU64::new(0));
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Times(2))
            .with_bus(bus);
        schedule(counting(&calls), opts).run().await.unwrap();

        let kinds: Vec<_> = drain(&mut rx).iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::RunStarting,
                EventKind::IterationStarting,
                EventKind::IterationCompleted,
                EventKind::IterationStarting,
                EventKind::IterationCompleted,
                EventKind::RunCompleted,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_for_timed_out_run() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let calls = Arc::new(AtomicU64::new(0));
        let opts = ScheduleOptions::new()
            .with_repeat(Repeat::Times(3))
            .with_delay(ms(500))
            .with_timeout(ms(300))
            .with_bus(bus);
        schedule(counting(&calls), opts).run().await.unwrap_err();

        let events = drain(&mut rx);
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::RunStarting,
                EventKind::DelayScheduled,
                EventKind::TimeoutHit,
                EventKind::RunFailed,
            ]
        );
        assert_eq!(events[0].timeout_ms, Some(300));
        assert_eq!(events[2].timeout_ms, Some(300));
        assert_eq!(events[3].reason.as_deref(), Some("schedule_timeout"));
    }
}
