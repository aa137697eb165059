//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into a
//! [`SubscriberSet`](crate::subscribers::SubscriberSet). Each subscriber reads the
//! bus through its own receiver on a dedicated worker task.
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching); they do **not** block the
//!   scheduled runs nor other subscribers. A subscriber that falls behind the bus
//!   capacity skips events (warn).
//! - [`Subscribe::accepts`] is checked before every delivery; rejected kinds never
//!   reach [`Subscribe::on_event`].
//!
//! ## Example
//! ```rust
//! use taskloop::{Event, EventKind, Subscribe};
//!
//! struct Timeouts;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Timeouts {
//!     async fn on_event(&self, ev: &Event) {
//!         // page someone...
//!         let _ = ev.schedule.as_deref();
//!     }
//!     fn name(&self) -> &'static str { "timeouts" }
//!     fn accepts(&self, kind: EventKind) -> bool { kind == EventKind::TimeoutHit }
//! }
//! ```

use crate::events::{Event, EventKind};
use async_trait::async_trait;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether events of `kind` should be delivered. Defaults to all of them.
    fn accepts(&self, kind: EventKind) -> bool {
        let _ = kind;
        true
    }
}
