//! Time primitives.
//!
//! Re-exports the executor's timers and adds [`Ticker`], a fixed-cadence
//! timer that stops as soon as its [`CancellationToken`] fires.

pub use tokio::time::{interval, sleep, sleep_until, timeout, Interval, MissedTickBehavior, Sleep};

pub use std::time::{Duration, SystemTime, UNIX_EPOCH};
pub use tokio::time::Instant;

/// Error returned by [`timeout`] when the deadline passes first.
pub use tokio::time::error::Elapsed;

use crate::sync::CancellationToken;

/// Cancellable periodic timer.
///
/// The first tick completes immediately, later ticks follow `period`. Ticks
/// missed because the consumer was slow are skipped rather than bunched up,
/// so a stalled poller never fires a burst on recovery.
#[derive(Debug)]
pub struct Ticker {
    interval: Interval,
    token: CancellationToken,
}

impl Ticker {
    /// Create a ticker bound to `token`.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn new(period: Duration, token: CancellationToken) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval, token }
    }

    /// Wait for the next tick.
    ///
    /// Returns `false` once the token is cancelled; cancellation wins over a
    /// tick that becomes ready at the same instant.
    pub async fn tick(&mut self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            _ = self.interval.tick() => !self.token.is_cancelled(),
        }
    }

    /// Period between ticks.
    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    /// Token controlling this ticker.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}
