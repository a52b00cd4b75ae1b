//! Integration tests for logging initialization and the event bus.

use bridge_traits::{LogLevel, PlaybackState};
use core_runtime::events::{CoreEvent, EventBus, EventStream, PlaybackEvent, SubtitleEvent};
use core_runtime::logging::{init_logging, redact_uri, LogFormat, LoggingConfig};

#[test]
fn test_logging_initializes_once() {
    // Only one global subscriber per process.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);
    assert!(init_logging(config.clone()).is_ok());
    assert!(init_logging(config).is_err());

    tracing::debug!(uri = %redact_uri("https://cdn.example.com/a.mp4?sig=1"), "opening");
}

#[tokio::test]
async fn test_observer_sees_events_in_emission_order() {
    let bus = EventBus::default();
    let mut stream = EventStream::new(bus.subscribe());

    let sequence = vec![
        CoreEvent::Playback(PlaybackEvent::SourceChanged {
            source: Some("file:clip.mp4".to_string()),
        }),
        CoreEvent::Playback(PlaybackEvent::StateChanged {
            previous: PlaybackState::None,
            current: PlaybackState::Opening,
        }),
        CoreEvent::Subtitle(SubtitleEvent::TrackCleared),
        CoreEvent::Playback(PlaybackEvent::StateChanged {
            previous: PlaybackState::Opening,
            current: PlaybackState::Paused,
        }),
    ];

    for event in &sequence {
        bus.emit(event.clone()).unwrap();
    }

    for expected in sequence {
        assert_eq!(stream.recv().await.unwrap(), expected);
    }
}

#[tokio::test]
async fn test_filtered_stream_skips_position_ticks() {
    let bus = EventBus::new(32);
    let mut stream = EventStream::new(bus.subscribe()).filter(|event| {
        !matches!(
            event,
            CoreEvent::Playback(PlaybackEvent::PositionChanged { .. })
        )
    });

    for ms in [0u64, 250, 500] {
        bus.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
            position_ms: ms,
            duration_ms: 1000,
        }))
        .unwrap();
    }
    bus.emit(CoreEvent::Playback(PlaybackEvent::MediaEnded))
        .unwrap();

    assert_eq!(
        stream.recv().await.unwrap(),
        CoreEvent::Playback(PlaybackEvent::MediaEnded)
    );
    assert!(stream.try_recv().is_none());
}
