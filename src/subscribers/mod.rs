//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! the built-in [`LogWriter`] for handling run events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Schedule::call ── publish(Event) ──► Bus
//!                                         │  one receiver per subscriber
//!                              ┌──────────┼──────────┐   (SubscriberSet::attach)
//!                              ▼          ▼          ▼
//!                          LogWriter    Metrics    Custom
//! ```
//!
//! Subscribers are opt-in: a schedule without a bus publishes nothing.

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
