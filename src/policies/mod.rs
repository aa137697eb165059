//! Repeat and delay policies.
//!
//! This module groups the knobs that control **whether** a run performs another
//! call and **how long** it waits before each call.
//!
//! ## Contents
//! - [`Repeat`]        once / forever / `n` times / while a predicate holds
//! - [`Delay`]         constant, computed from run state, or backoff-driven
//! - [`BackoffPolicy`] exponential growth (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization of backoff delays
//!
//! ## Quick wiring
//! ```text
//! ScheduleOptions { repeat: Repeat, delay: Option<Delay>, timeout: Option<Duration> }
//!      └─► core::scheduler uses:
//!           - repeat.evaluate(latest, iteration) before every call
//!           - delay.resolve(latest, iteration) for the wait before that call
//! ```
//!
//! ## Defaults
//! - `Repeat::Once`, no delay, no timeout.
//! - `BackoffPolicy::default()` → first=100ms, factor=2.0, max=30s, jitter=None.

mod backoff;
mod delay;
mod jitter;
mod repeat;

pub use backoff::BackoffPolicy;
pub use delay::{Delay, DelayFn};
pub use jitter::JitterPolicy;
pub use repeat::{Predicate, Repeat};

pub(crate) use repeat::Verdict;
