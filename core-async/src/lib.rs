//! Runtime abstraction layer for the media orchestrator.
//!
//! Every other crate in the workspace reaches async primitives through this
//! crate instead of naming the executor directly. Native engines call back
//! from threads they choose, so everything exported here is `Send + Sync`.
//!
//! # Modules
//!
//! - `runtime`: handle lookup and a blocking entry point for synchronous callers
//! - `sync`: locks, semaphores, channels and cancellation tokens
//! - `task`: task spawning
//! - `time`: timeouts, sleeps and the cancellable [`time::Ticker`]
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//! use core_async::time::{Duration, Ticker};
//!
//! async fn poll_until_cancelled(token: CancellationToken) -> u32 {
//!     let mut ticker = Ticker::new(Duration::from_secs(1), token);
//!     let mut ticks = 0;
//!     while ticker.tick().await {
//!         ticks += 1;
//!     }
//!     ticks
//! }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};

/// Wait on several futures and run the branch of the first to finish.
pub use tokio::select;
