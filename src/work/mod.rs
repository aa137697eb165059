//! # Units of work and their schedule options.
//!
//! This module provides:
//! - [`Work`] - trait for an async operation invoked once per iteration
//! - [`WorkFn`] - closure-backed implementation
//! - [`ScheduleOptions`] - repeat / delay / timeout bundle for a schedule

mod options;
mod unit;
mod work_fn;

pub use options::ScheduleOptions;
pub use unit::{BoxWorkFuture, Work};
pub use work_fn::WorkFn;
