//! # Event Bus System
//!
//! Typed observer registry for the orchestrator, built on
//! `tokio::sync::broadcast` (re-exported through `core_async::sync`).
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: [`CoreEvent`] wrapping [`PlaybackEvent`] and [`SubtitleEvent`]
//! - **EventBus**: broadcast channel owned by the component that emits
//! - **EventStream**: receiver wrapper with optional filtering
//!
//! Subscribing returns a receiver; dropping it unsubscribes. Because the bus
//! is owned by the emitting component, disposing the component closes every
//! subscription with [`RecvError::Closed`].
//!
//! ```text
//! ┌──────────────────────┐  emit   ┌──────────┐  subscribe  ┌────────────┐
//! │ PlaybackOrchestrator ├────────>│          ├────────────>│ UI binding │
//! └──────────────────────┘         │ EventBus │             └────────────┘
//! ┌──────────────────────┐  emit   │          │  subscribe  ┌────────────┐
//! │ SubtitleEngine       ├────────>│          ├────────────>│ Now-playing│
//! └──────────────────────┘         └──────────┘             └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Playback(PlaybackEvent::MediaEnded)).ok();
//! assert_eq!(rx.recv().await.unwrap(), CoreEvent::Playback(PlaybackEvent::MediaEnded));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Position
//!   ticks are the usual culprit; keep reading.
//! - **`RecvError::Closed`**: the emitting component was disposed.

use bridge_traits::PlaybackState;
use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Playback(PlaybackEvent),
    Subtitle(SubtitleEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Subtitle(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::MediaFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::StateChanged { .. })
            | CoreEvent::Playback(PlaybackEvent::MediaEnded)
            | CoreEvent::Subtitle(SubtitleEvent::TrackLoaded { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Observable surface of the playback state machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// The externally visible state changed.
    StateChanged {
        previous: PlaybackState,
        current: PlaybackState,
    },
    /// Position/duration report forwarded from the engine.
    PositionChanged {
        position_ms: u64,
        duration_ms: u64,
    },
    /// A seek finished, or its deadline passed under the lenient policy.
    SeekCompleted {
        position_ms: u64,
    },
    /// A new media source was pushed, or the source was cleared.
    SourceChanged {
        /// Redacted description of the source, `None` when cleared.
        source: Option<String>,
    },
    /// Effective volume or mute flag changed.
    VolumeChanged {
        volume: f32,
        muted: bool,
    },
    /// Playback reached the end of the media with looping disabled.
    MediaEnded,
    /// The engine reported an unrecoverable error.
    MediaFailed {
        message: String,
        code: Option<String>,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::StateChanged { .. } => "Playback state changed",
            PlaybackEvent::PositionChanged { .. } => "Playback position changed",
            PlaybackEvent::SeekCompleted { .. } => "Seek completed",
            PlaybackEvent::SourceChanged { .. } => "Media source changed",
            PlaybackEvent::VolumeChanged { .. } => "Volume changed",
            PlaybackEvent::MediaEnded => "Media ended",
            PlaybackEvent::MediaFailed { .. } => "Media failed",
        }
    }
}

// ============================================================================
// Subtitle Events
// ============================================================================

/// Renderer-facing copy of the active cue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CueSnapshot {
    pub text: String,
    pub start_ms: u64,
    pub end_ms: u64,
}

/// Observable surface of the subtitle synchronization engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SubtitleEvent {
    /// A parsed track replaced the previous one.
    TrackLoaded { cue_count: usize },
    /// The track was dropped (source change or dispose).
    TrackCleared,
    /// The active cue changed; `None` means hide.
    ActiveCueChanged { cue: Option<CueSnapshot> },
}

impl SubtitleEvent {
    fn description(&self) -> &str {
        match self {
            SubtitleEvent::TrackLoaded { .. } => "Subtitle track loaded",
            SubtitleEvent::TrackCleared => "Subtitle track cleared",
            SubtitleEvent::ActiveCueChanged { .. } => "Active subtitle cue changed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast channel owned by an emitting component.
///
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends; slow subscribers get `RecvError::Lagged`
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if nobody is listening. Emitters treat the latter as a no-op.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let playback_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Playback(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once the emitter is gone.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Receives a pending event without waiting.
    ///
    /// Returns `None` if no matching event is currently queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn state_changed(previous: PlaybackState, current: PlaybackState) -> CoreEvent {
        CoreEvent::Playback(PlaybackEvent::StateChanged { previous, current })
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus
            .emit(CoreEvent::Playback(PlaybackEvent::MediaEnded))
            .is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = state_changed(PlaybackState::Opening, PlaybackState::Paused);
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_dropping_receiver_unsubscribes() {
        let bus = EventBus::new(10);
        let sub = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Subtitle(_)));

        bus.emit(state_changed(PlaybackState::None, PlaybackState::Opening))
            .ok();
        let subtitle = CoreEvent::Subtitle(SubtitleEvent::TrackLoaded { cue_count: 3 });
        bus.emit(subtitle.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), subtitle);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5u64 {
            bus.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                position_ms: i * 1000,
                duration_ms: 10_000,
            }))
            .ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[tokio::test]
    async fn test_closed_when_bus_dropped() {
        let bus = EventBus::new(4);
        let mut stream = EventStream::new(bus.subscribe());
        drop(bus);
        assert!(matches!(stream.recv().await, Err(RecvError::Closed)));
    }

    #[test]
    fn test_event_severity() {
        let failed = CoreEvent::Playback(PlaybackEvent::MediaFailed {
            message: "decoder crashed".to_string(),
            code: Some("E42".to_string()),
        });
        assert_eq!(failed.severity(), EventSeverity::Error);

        let changed = state_changed(PlaybackState::Paused, PlaybackState::Playing);
        assert_eq!(changed.severity(), EventSeverity::Info);

        let tick = CoreEvent::Playback(PlaybackEvent::PositionChanged {
            position_ms: 5000,
            duration_ms: 180_000,
        });
        assert_eq!(tick.severity(), EventSeverity::Debug);
        assert_eq!(tick.description(), "Playback position changed");
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Subtitle(SubtitleEvent::ActiveCueChanged {
            cue: Some(CueSnapshot {
                text: "Hi".to_string(),
                start_ms: 1000,
                end_ms: 2000,
            }),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("ActiveCueChanged"));

        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());
        assert!(stream.try_recv().is_none());
    }
}
