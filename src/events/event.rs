//! # Lifecycle events emitted by scheduled runs.
//!
//! The [`EventKind`] enum classifies event types in two categories:
//! - **Run events**: a run starting and settling (completed / failed)
//! - **Iteration events**: delay scheduled, call starting, call settled, timeout
//!
//! The [`Event`] struct carries metadata such as timestamps, schedule name,
//! run id, iteration index and delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Within one run, events are published in program order by the single active continuation.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskloop::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::DelayScheduled)
//!     .with_schedule("poll-status")
//!     .with_run(7)
//!     .with_iteration(2)
//!     .with_delay(Duration::from_millis(250));
//!
//! assert_eq!(ev.kind, EventKind::DelayScheduled);
//! assert_eq!(ev.schedule.as_deref(), Some("poll-status"));
//! assert_eq!(ev.delay_ms, Some(250));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run events ===
    /// A run was started by calling the schedule.
    ///
    /// Sets:
    /// - `schedule`, `run`
    /// - `timeout_ms`: overall deadline, if configured
    RunStarting,

    /// The run settled successfully.
    ///
    /// Sets: `schedule`, `run`
    RunCompleted,

    /// The run settled with an error (unit of work, predicate or timeout).
    ///
    /// Sets:
    /// - `schedule`, `run`
    /// - `reason`: error label (`ScheduleError::as_label`)
    RunFailed,

    // === Iteration events ===
    /// A delay before the next call was scheduled (only when a delay is configured).
    ///
    /// Sets:
    /// - `schedule`, `run`
    /// - `iteration`: index of the call about to be attempted
    /// - `delay_ms`: resolved delay
    DelayScheduled,

    /// The unit of work is about to be called.
    ///
    /// Sets: `schedule`, `run`, `iteration`
    IterationStarting,

    /// The unit of work returned a value.
    ///
    /// Sets: `schedule`, `run`, `iteration` (index of the finished call)
    IterationCompleted,

    /// The unit of work returned an error; the run stops.
    ///
    /// Sets: `schedule`, `run`, `iteration`
    IterationFailed,

    /// The timeout guard fired.
    ///
    /// Sets: `schedule`, `run`, `iteration`, `timeout_ms`
    TimeoutHit,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the schedule (its unit of work).
    pub schedule: Option<Arc<str>>,
    /// Id of the run that published the event.
    pub run: Option<u64>,
    /// Iteration index (0-based).
    pub iteration: Option<u64>,
    /// Delay before the next call in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Overall run timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable reason (error label).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            schedule: None,
            run: None,
            iteration: None,
            delay_ms: None,
            timeout_ms: None,
            reason: None,
        }
    }

    /// Attaches a schedule name.
    #[inline]
    pub fn with_schedule(mut self, name: impl Into<Arc<str>>) -> Self {
        self.schedule = Some(name.into());
        self
    }

    /// Attaches a run id.
    #[inline]
    pub fn with_run(mut self, run: u64) -> Self {
        self.run = Some(run);
        self
    }

    /// Attaches an iteration index.
    #[inline]
    pub fn with_iteration(mut self, iteration: u64) -> Self {
        self.iteration = Some(iteration);
        self
    }

    /// Attaches a delay (stored as milliseconds, saturating at `u32::MAX`).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a timeout (stored as milliseconds, saturating at `u32::MAX`).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}
