//! Task spawning.
//!
//! The event pump and the subtitle poller are both long-lived tasks spawned
//! through [`spawn`]; their handles are aborted on dispose.

pub use tokio::task::{yield_now, AbortHandle, JoinError, JoinHandle};

/// Spawn `future` on the current runtime.
///
/// # Panics
///
/// Panics when called outside a runtime context.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Result type for joined tasks.
pub type Result<T> = std::result::Result<T, JoinError>;
