//! # Unit of work.
//!
//! [`Work`] is the operation a schedule invokes on every iteration. It takes the
//! arguments the run was started with and returns a boxed future producing either
//! a value or an error.
//!
//! Each call returns a **fresh** future, so nothing is shared between iterations
//! unless the implementation shares it explicitly (e.g. through an `Arc`).

use std::sync::Arc;

use futures::future::BoxFuture;

/// Boxed future returned by [`Work::call`].
pub type BoxWorkFuture<T, E> = BoxFuture<'static, Result<T, E>>;

/// # Asynchronous unit of work.
///
/// # Example
/// ```
/// use futures::FutureExt;
/// use taskloop::{BoxWorkFuture, Work};
///
/// struct Ping;
///
/// impl Work<String> for Ping {
///     type Output = usize;
///     type Error = std::io::Error;
///
///     fn name(&self) -> &str { "ping" }
///
///     fn call(&self, host: String) -> BoxWorkFuture<usize, std::io::Error> {
///         async move { Ok(host.len()) }.boxed()
///     }
/// }
/// ```
pub trait Work<A>: Send + Sync + 'static {
    /// Value produced by a successful call.
    type Output: Send + 'static;
    /// Error produced by a failed call.
    type Error: Send + 'static;

    /// Returns a stable, human-readable name (used in events).
    fn name(&self) -> &str;

    /// Starts one call with the run's arguments.
    fn call(&self, args: A) -> BoxWorkFuture<Self::Output, Self::Error>;
}

impl<A, W> Work<A> for Arc<W>
where
    W: Work<A> + ?Sized,
{
    type Output = W::Output;
    type Error = W::Error;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn call(&self, args: A) -> BoxWorkFuture<Self::Output, Self::Error> {
        (**self).call(args)
    }
}
