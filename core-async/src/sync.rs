//! Synchronization primitives.
//!
//! The orchestrator keeps short, non-suspending critical sections on
//! `parking_lot` locks; everything that must be awaited lives here.
//!
//! - [`Semaphore`] backs the single-slot seek gate.
//! - [`oneshot`] carries a seek completion from the engine event pump to the
//!   waiting caller.
//! - [`watch`] publishes the latest playback state and position.
//! - [`broadcast`] fans out events to every subscriber.
//! - [`CancellationToken`] aborts seek waits and subtitle polling.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{CancellationToken, Semaphore};
//!
//! # async fn example() {
//! let gate = Semaphore::new(1);
//! let token = CancellationToken::new();
//!
//! let permit = gate.acquire().await.unwrap();
//! token.cancel();
//! drop(permit);
//! assert_eq!(gate.available_permits(), 1);
//! # }
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, OwnedSemaphorePermit, RwLock,
    Semaphore, SemaphorePermit,
};

pub use tokio_util::sync::{CancellationToken, DropGuard, WaitForCancellationFuture};
