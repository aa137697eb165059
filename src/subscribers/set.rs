//! # SubscriberSet: subscribers attached to a bus.
//!
//! [`SubscriberSet::attach`] gives every subscriber its **own** bus receiver and
//! worker task. Runs publish into the [`Bus`] and never wait on the workers.
//!
//! ```text
//!             ┌─► receiver S1 ─► accepts(kind)? ─► worker S1 ─► on_event()
//!  Bus ───────┼─► receiver S2 ─► accepts(kind)? ─► worker S2 ─► on_event()
//!             └─► receiver SN ─► accepts(kind)? ─► worker SN ─► on_event()
//! ```
//!
//! ## Rules
//! - Per-subscriber FIFO; no ordering across subscribers.
//! - A slow subscriber lags on its own receiver and skips the oldest events (warn);
//!   the others are unaffected.
//! - A panicking handler is caught and logged; its worker keeps running.
//! - [`SubscriberSet::shutdown`] lets each worker drain what its receiver already
//!   holds, then stops it.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use taskloop::{Bus, Event, EventKind, Subscribe, SubscriberSet};
//!
//! struct Failures;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Failures {
//!     async fn on_event(&self, ev: &Event) {
//!         eprintln!("run {:?} failed: {:?}", ev.run, ev.reason);
//!     }
//!     fn accepts(&self, kind: EventKind) -> bool {
//!         kind == EventKind::RunFailed
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = Bus::new(256);
//! let set = SubscriberSet::attach(&bus, vec![Arc::new(Failures) as _]);
//!
//! // ... schedules built with `.with_bus(bus.clone())` ...
//!
//! set.shutdown().await;
//! # }
//! ```

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio::{
    sync::broadcast::{error::RecvError, Receiver},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::events::{Bus, Event};

use super::Subscribe;

/// Worker tasks delivering bus events to a fixed group of subscribers.
pub struct SubscriberSet {
    token: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Subscribes each of `subs` to `bus` and spawns its worker.
    ///
    /// Only events published after this call are delivered. Must be called
    /// within a tokio runtime.
    #[must_use]
    pub fn attach(bus: &Bus, subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let token = CancellationToken::new();
        let workers = subs
            .into_iter()
            .map(|sub| tokio::spawn(deliver(sub, bus.subscribe(), token.child_token())))
            .collect();
        Self { token, workers }
    }

    /// Stops the workers once their buffered events are delivered, and waits for them.
    pub async fn shutdown(self) {
        self.token.cancel();
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    /// True if no subscriber is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Number of attached subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }
}

async fn deliver(sub: Arc<dyn Subscribe>, mut rx: Receiver<Event>, token: CancellationToken) {
    loop {
        let ev = tokio::select! {
            biased;
            msg = rx.recv() => match msg {
                Ok(ev) => ev,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(subscriber = sub.name(), skipped, "subscriber lagged behind the bus");
                    continue;
                }
                Err(RecvError::Closed) => return,
            },
            _ = token.cancelled() => return,
        };
        if !sub.accepts(ev.kind) {
            continue;
        }
        if let Err(panic) = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await {
            warn!(
                subscriber = sub.name(),
                seq = ev.seq,
                panic = panic_text(panic.as_ref()),
                "subscriber panicked"
            );
        }
    }
}

fn panic_text(panic: &(dyn Any + Send)) -> &str {
    match (panic.downcast_ref::<&'static str>(), panic.downcast_ref::<String>()) {
        (Some(s), _) => *s,
        (None, Some(s)) => s.as_str(),
        (None, None) => "<non-string panic>",
    }
}
