//! # Logging subscriber backed by `tracing`.
//!
//! [`LogWriter`] renders run events as `tracing` records, so they land wherever the
//! application's subscriber (fmt, json, OpenTelemetry, ...) sends them.
//!
//! ## Levels
//! ```text
//! RunStarting, IterationStarting, IterationCompleted, DelayScheduled → DEBUG
//! RunCompleted                                                      → INFO
//! IterationFailed, TimeoutHit, RunFailed                            → WARN
//! ```
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use taskloop::{Bus, LogWriter, SubscriberSet};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = Bus::new(256);
//! let set = SubscriberSet::attach(&bus, vec![Arc::new(LogWriter::runs_only()) as _]);
//! # set.shutdown().await;
//! # }
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber emitting one `tracing` record per event (target `taskloop`).
///
/// Enabled via the `logging` feature.
#[derive(Debug, Clone, Default)]
pub struct LogWriter {
    runs_only: bool,
}

impl LogWriter {
    /// A writer that skips iteration-level events and logs run outcomes only:
    /// `RunStarting`, `RunCompleted`, `RunFailed` and `TimeoutHit`.
    #[must_use]
    pub fn runs_only() -> Self {
        Self { runs_only: true }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let schedule = e.schedule.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::RunStarting => {
                debug!(target: "taskloop", schedule, run = e.run, timeout_ms = e.timeout_ms, "run starting");
            }
            EventKind::DelayScheduled => {
                debug!(
                    target: "taskloop",
                    schedule,
                    run = e.run,
                    iteration = e.iteration,
                    delay_ms = e.delay_ms,
                    "delay scheduled"
                );
            }
            EventKind::IterationStarting => {
                debug!(target: "taskloop", schedule, run = e.run, iteration = e.iteration, "iteration starting");
            }
            EventKind::IterationCompleted => {
                debug!(target: "taskloop", schedule, run = e.run, iteration = e.iteration, "iteration completed");
            }
            EventKind::IterationFailed => {
                warn!(target: "taskloop", schedule, run = e.run, iteration = e.iteration, "iteration failed");
            }
            EventKind::TimeoutHit => {
                warn!(
                    target: "taskloop",
                    schedule,
                    run = e.run,
                    iteration = e.iteration,
                    timeout_ms = e.timeout_ms,
                    "timeout hit"
                );
            }
            EventKind::RunCompleted => {
                info!(target: "taskloop", schedule, run = e.run, "run completed");
            }
            EventKind::RunFailed => {
                warn!(target: "taskloop", schedule, run = e.run, reason = e.reason.as_deref(), "run failed");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }

    fn accepts(&self, kind: EventKind) -> bool {
        !self.runs_only
            || matches!(
                kind,
                EventKind::RunStarting
                    | EventKind::RunCompleted
                    | EventKind::RunFailed
                    | EventKind::TimeoutHit
            )
    }
}
