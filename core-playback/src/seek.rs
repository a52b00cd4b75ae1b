//! # Seek Coordinator
//!
//! Turns the engine's fire-and-forget `seek_to` plus its later completion
//! callback into one awaitable operation.
//!
//! ## Overview
//!
//! - A single-permit semaphore keeps at most one seek in flight. Later
//!   requests queue behind it rather than being rejected.
//! - The in-flight seek parks a `oneshot` sender in a slot; the engine's
//!   `SeekCompleted` callback fires it through [`SeekCoordinator::complete`].
//! - The wait is bounded by a deadline. Under [`SeekTimeoutPolicy::Lenient`]
//!   an expired deadline counts as success; under `Strict` it is an error.
//! - Cancelling the caller's token ends the wait only. The native seek keeps
//!   running, and the permit is released either way.

use crate::error::{PlaybackError, Result};
use core_async::sync::{oneshot, CancellationToken, Semaphore};
use core_async::time::timeout;
use core_runtime::config::SeekTimeoutPolicy;
use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// How a seek resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOutcome {
    /// The engine confirmed the seek.
    Completed,
    /// The deadline passed without confirmation (lenient policy).
    TimedOut,
    /// Nothing to seek: no source loaded, or the session has failed.
    Skipped,
    /// The engine rejected the request; reported through `MediaFailed`.
    Failed,
}

impl SeekOutcome {
    /// Whether observers should be told the seek finished.
    pub fn is_settled(&self) -> bool {
        matches!(self, SeekOutcome::Completed | SeekOutcome::TimedOut)
    }
}

/// Serializes seeks against one engine.
#[derive(Debug)]
pub struct SeekCoordinator {
    slot: Semaphore,
    pending: Mutex<Option<oneshot::Sender<()>>>,
    deadline: Duration,
    policy: SeekTimeoutPolicy,
    closed: CancellationToken,
}

impl SeekCoordinator {
    pub fn new(deadline: Duration, policy: SeekTimeoutPolicy) -> Self {
        Self {
            slot: Semaphore::new(1),
            pending: Mutex::new(None),
            deadline,
            policy,
            closed: CancellationToken::new(),
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn policy(&self) -> SeekTimeoutPolicy {
        self.policy
    }

    /// Run one seek.
    ///
    /// `issue` sends the native request; it runs only once this call owns the
    /// slot. An error from `issue` is returned as [`PlaybackError::Adapter`].
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::Cancelled`] if `cancel` fires first
    /// - [`PlaybackError::SeekTimeout`] on an expired deadline under `Strict`
    /// - [`PlaybackError::Disposed`] if the coordinator was closed
    pub async fn run<F, Fut>(
        &self,
        target: Duration,
        cancel: &CancellationToken,
        issue: F,
    ) -> Result<SeekOutcome>
    where
        F: FnOnce(Duration) -> Fut,
        Fut: Future<Output = bridge_traits::error::Result<()>>,
    {
        let permit = core_async::select! {
            biased;
            _ = self.closed.cancelled() => return Err(PlaybackError::Disposed),
            _ = cancel.cancelled() => return Err(PlaybackError::Cancelled),
            permit = self.slot.acquire() => permit.map_err(|_| PlaybackError::Disposed)?,
        };

        let (tx, rx) = oneshot::channel();
        *self.pending.lock() = Some(tx);

        debug!(target_ms = target.as_millis() as u64, "Issuing native seek");
        if let Err(err) = issue(target).await {
            self.pending.lock().take();
            return Err(PlaybackError::Adapter(err));
        }

        let outcome = core_async::select! {
            biased;
            _ = self.closed.cancelled() => Err(PlaybackError::Disposed),
            _ = cancel.cancelled() => Err(PlaybackError::Cancelled),
            waited = timeout(self.deadline, rx) => match waited {
                Ok(Ok(())) => Ok(SeekOutcome::Completed),
                Ok(Err(_)) => Err(PlaybackError::Disposed),
                Err(_) => self.on_deadline(target),
            },
        };

        // A late callback for this seek must not resolve the next one.
        self.pending.lock().take();
        drop(permit);

        outcome
    }

    fn on_deadline(&self, target: Duration) -> Result<SeekOutcome> {
        match self.policy {
            SeekTimeoutPolicy::Lenient => {
                warn!(
                    target_ms = target.as_millis() as u64,
                    deadline_s = self.deadline.as_secs(),
                    "Seek not confirmed before deadline; assuming it completed"
                );
                Ok(SeekOutcome::TimedOut)
            }
            SeekTimeoutPolicy::Strict => Err(PlaybackError::SeekTimeout(self.deadline)),
        }
    }

    /// Resolve the in-flight seek. Returns `false` if none was waiting.
    pub fn complete(&self) -> bool {
        match self.pending.lock().take() {
            Some(tx) => tx.send(()).is_ok(),
            None => {
                debug!("Seek completion with no seek in flight");
                false
            }
        }
    }

    /// Returns `true` while a seek owns the slot.
    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Fail every current and future seek with [`PlaybackError::Disposed`].
    pub fn close(&self) {
        self.closed.cancel();
        self.slot.close();
        self.pending.lock().take();
    }
}
