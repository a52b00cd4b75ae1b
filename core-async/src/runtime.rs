//! Executor handles.
//!
//! Used by code that may run outside an async context, such as `tracing`
//! layers invoked from a native callback thread.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Drive `future` to completion on the calling thread.
///
/// Only meant for cold paths where no runtime is reachable through
/// [`Handle::try_current`]. The future must not depend on tokio's reactor.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    futures::executor::block_on(future)
}
