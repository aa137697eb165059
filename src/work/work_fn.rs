//! # Function-backed unit of work (`WorkFn`)
//!
//! [`WorkFn`] wraps a closure `F: Fn(A) -> Fut`, producing a fresh future per call.
//!
//! ## Example
//! ```rust
//! use taskloop::{Work, WorkFn};
//!
//! let w = WorkFn::new("double", |x: u32| async move { Ok::<_, std::io::Error>(x * 2) });
//! assert_eq!(Work::<u32>::name(&w), "double");
//! ```

use std::borrow::Cow;
use std::future::Future;

use futures::FutureExt;

use super::unit::{BoxWorkFuture, Work};

/// Function-backed [`Work`] implementation.
#[derive(Debug)]
pub struct WorkFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkFn<F> {
    /// Creates a new function-backed unit of work.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<A, F, Fut, T, E> Work<A> for WorkFn<F>
where
    F: Fn(A) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: A) -> BoxWorkFuture<T, E> {
        (self.f)(args).boxed()
    }
}
