//! Runtime core: the scheduling loop.
//!
//! The only public API from this module is [`schedule`] and [`Schedule`].
//!
//! Internal modules:
//! - [`scheduler`]: drives one run per call through repeat, delay and the unit of work;
//! - [`guard`]: bounds every suspension of a run by its deadline.

mod guard;
mod scheduler;

pub use scheduler::{schedule, RunResult, Schedule};
