//! # taskloop
//!
//! **Taskloop** is a small async scheduling primitive for Rust.
//!
//! It repeats a unit of work under a repeat policy, waits a (possibly computed)
//! delay before every call, and bounds the whole run by an optional overall
//! timeout. Polling helpers such as [`wait_for()`] are built on top of it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐        ┌─────────────────────────────────────┐
//!     │  Work<A>     │        │  ScheduleOptions                    │
//!     │ (WorkFn, ..) │        │  - repeat:  Repeat                  │
//!     └──────┬───────┘        │  - delay:   Option<Delay>           │
//!            │                │  - timeout: Option<Duration>        │
//!            │                │  - bus:     Option<Bus>             │
//!            │                └──────────────────┬──────────────────┘
//!            ▼                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  schedule(work, options) ─► Schedule (cheap to clone)             │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ call(args)   │   │ call(args)   │   │ wait_for(..) │
//!     │ run #1       │   │ run #2       │   │ run #3       │
//!     │ TimeoutGuard │   │ TimeoutGuard │   │ TimeoutGuard │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ Publishes (only when options carry a bus):
//!      │ RunStarting, DelayScheduled, IterationStarting, ...
//!      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       SubscriberSet::attach
//!                        (one receiver + worker per subscriber)
//!                                  ┌─────────┼─────────┐
//!                                  ▼         ▼         ▼
//!                               LogWriter  worker2  workerN
//! ```
//!
//! ### Lifecycle of one run
//! ```text
//! Schedule::call(args)
//!
//! arm TimeoutGuard(timeout)
//! loop {
//!   ├─► repeat.evaluate(latest, iteration)      false ─► Ok(latest)
//!   ├─► delay.resolve(latest, iteration)
//!   ├─► guard.suspend(delay)                    deadline first ─► Err(Timeout)
//!   ├─► work.call(args.clone())                 Err ─► Err(Work(e))
//!   └─► latest = Some(value); iteration += 1
//! }
//! ```
//! `Repeat::Once` skips the policy and makes exactly one call; `Repeat::Times(0)`
//! makes none but still waits the delay once.
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                         |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Scheduling**    | Repeat a unit of work with delays and an overall timeout.    | [`schedule`], [`Schedule`]                 |
//! | **Work**          | Define units of work as closures or trait objects.           | [`Work`], [`WorkFn`]                       |
//! | **Policies**      | Repeat decisions and delay strategies.                       | [`Repeat`], [`Delay`], [`BackoffPolicy`]   |
//! | **Polling**       | Wait until an async condition holds.                         | [`wait_for()`], [`try_wait_for`]             |
//! | **Errors**        | Typed run errors and timeout classification.                 | [`ScheduleError`], [`is_timeout_error`]    |
//! | **Events**        | Observe runs through a broadcast bus and subscribers.        | [`Bus`], [`Event`], [`Subscribe`]          |
//! | **Configuration** | Shared defaults for options and bus sizing.                  | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging` (default): exports the [`LogWriter`] subscriber, rendering events with `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskloop::{schedule, Repeat, ScheduleOptions, WorkFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Poll a job until it reports "completed", every 10ms, for at most 1s.
//!     let status = WorkFn::new("job-status", |job: u32| async move {
//!         let _ = job;
//!         Ok::<_, std::io::Error>("completed")
//!     });
//!     let poll = schedule(
//!         status,
//!         ScheduleOptions::new()
//!             .with_repeat(Repeat::predicate(|last: Option<&&str>, _| last != Some(&"completed")))
//!             .with_delay(Duration::from_millis(10))
//!             .with_timeout(Duration::from_secs(1)),
//!     );
//!
//!     assert_eq!(poll.call(42).await?, Some("completed"));
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;
mod wait_for;
mod work;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{schedule, RunResult, Schedule};
pub use error::{is_timeout_error, ScheduleError, TimeoutElapsed};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, Delay, DelayFn, JitterPolicy, Predicate, Repeat};
pub use subscribers::{Subscribe, SubscriberSet};
pub use wait_for::{try_wait_for, wait_for, PollDelay};
pub use work::{BoxWorkFuture, ScheduleOptions, Work, WorkFn};

// Optional: expose the built-in logging subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
