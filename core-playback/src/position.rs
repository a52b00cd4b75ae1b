//! Read-only view of the engine's last reported position.
//!
//! The orchestrator publishes every accepted position tick and every reset
//! into a `watch` channel. Readers (the subtitle engine, now-playing
//! surfaces) get a cheap, lock-free snapshot of the latest value.

use core_async::sync::watch;
use std::time::Duration;

/// Position and duration as of the last engine report or reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionSnapshot {
    pub position: Duration,
    pub duration: Duration,
}

/// Writing half, owned by the playback session.
#[derive(Debug)]
pub(crate) struct PositionPublisher {
    tx: watch::Sender<PositionSnapshot>,
}

impl PositionPublisher {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(PositionSnapshot::default());
        Self { tx }
    }

    pub(crate) fn publish(&self, snapshot: PositionSnapshot) {
        self.tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    pub(crate) fn source(&self) -> PositionSource {
        PositionSource {
            rx: self.tx.subscribe(),
        }
    }
}

/// Cloneable reader of the current playback position.
#[derive(Debug, Clone)]
pub struct PositionSource {
    rx: watch::Receiver<PositionSnapshot>,
}

impl PositionSource {
    pub fn snapshot(&self) -> PositionSnapshot {
        *self.rx.borrow()
    }

    pub fn position(&self) -> Duration {
        self.rx.borrow().position
    }

    pub fn duration(&self) -> Duration {
        self.rx.borrow().duration
    }

    /// Wait for the next published change.
    ///
    /// Returns `None` once the orchestrator has been dropped.
    pub async fn changed(&mut self) -> Option<PositionSnapshot> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn readers_see_latest_value() {
        let publisher = PositionPublisher::new();
        let mut source = publisher.source();
        assert_eq!(source.position(), Duration::ZERO);

        let snapshot = PositionSnapshot {
            position: Duration::from_millis(1500),
            duration: Duration::from_secs(10),
        };
        publisher.publish(snapshot);

        assert_eq!(source.changed().await, Some(snapshot));
        assert_eq!(source.duration(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn changed_ends_when_publisher_dropped() {
        let publisher = PositionPublisher::new();
        let mut source = publisher.source();
        drop(publisher);
        assert_eq!(source.changed().await, None);
    }

    #[test]
    fn unchanged_publish_does_not_notify() {
        let publisher = PositionPublisher::new();
        let source = publisher.source();
        publisher.publish(PositionSnapshot::default());
        assert!(!source.rx.has_changed().unwrap());
    }
}
