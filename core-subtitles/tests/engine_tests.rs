//! Polling behavior of the subtitle engine against a scripted position.

use core_runtime::events::{CoreEvent, CueSnapshot, EventBus, SubtitleEvent};
use core_subtitles::{SubtitleCue, SubtitleEngine, SubtitleFormat};
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

const TRACK: &str = "1\n00:00:00,000 --> 00:00:02,000\nA\n\n2\n00:00:02,000 --> 00:00:04,000\nB\n";

#[derive(Clone, Default)]
struct Playhead(Arc<Mutex<Duration>>);

impl Playhead {
    fn set(&self, secs: f64) {
        *self.0.lock() = Duration::from_secs_f64(secs);
    }

    fn provider(&self) -> impl Fn() -> Duration + Send + Sync + 'static {
        let inner = Arc::clone(&self.0);
        move || *inner.lock()
    }
}

fn texts(changes: Vec<Option<SubtitleCue>>) -> Vec<Option<String>> {
    changes.into_iter().map(|cue| cue.map(|c| c.text)).collect()
}

/// Drain whatever changes are already buffered.
async fn drain(stream: &mut core_subtitles::ActiveCueStream) -> Vec<Option<SubtitleCue>> {
    let mut seen = Vec::new();
    while let Ok(Some(cue)) = tokio::time::timeout(Duration::from_millis(1), stream.next()).await {
        seen.push(cue);
    }
    seen
}

#[tokio::test(start_paused = true)]
async fn emits_only_changes_with_inclusive_first_match() {
    let engine = SubtitleEngine::default();
    assert_eq!(engine.load_text(TRACK, SubtitleFormat::Srt), Ok(2));

    let playhead = Playhead::default();
    let mut changes = engine.active_cue_changes();

    playhead.set(0.5);
    assert!(engine.start(playhead.provider()));
    tokio::time::sleep(Duration::from_millis(500)).await;
    playhead.set(2.0);
    tokio::time::sleep(Duration::from_secs(1)).await;
    playhead.set(2.1);
    tokio::time::sleep(Duration::from_secs(1)).await;
    playhead.set(5.0);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(
        texts(drain(&mut changes).await),
        vec![Some("A".to_string()), Some("B".to_string()), None]
    );
}

#[tokio::test(start_paused = true)]
async fn no_change_after_stop() {
    let engine = SubtitleEngine::default();
    engine.load_text(TRACK, SubtitleFormat::Srt).unwrap();
    let playhead = Playhead::default();
    let mut changes = engine.active_cue_changes();

    playhead.set(1.0);
    engine.start(playhead.provider());
    tokio::time::sleep(Duration::from_millis(100)).await;
    engine.stop();
    assert!(!engine.is_running());

    playhead.set(3.0);
    tokio::time::sleep(Duration::from_secs(5)).await;

    // Shown, then hidden by stop; the later position is never evaluated.
    assert_eq!(
        texts(drain(&mut changes).await),
        vec![Some("A".to_string()), None]
    );
    assert_eq!(engine.active_cue(), None);
}

#[tokio::test(start_paused = true)]
async fn restart_resumes_clean() {
    let engine = SubtitleEngine::default();
    engine.load_text(TRACK, SubtitleFormat::Srt).unwrap();
    let playhead = Playhead::default();
    let mut changes = engine.active_cue_changes();

    playhead.set(1.0);
    engine.start(playhead.provider());
    tokio::time::sleep(Duration::from_millis(100)).await;
    engine.stop();

    assert!(engine.start(playhead.provider()));
    assert!(!engine.start(playhead.provider()));
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The same cue is shown again after the restart.
    assert_eq!(
        texts(drain(&mut changes).await),
        vec![Some("A".to_string()), None, Some("A".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn empty_track_never_activates() {
    let engine = SubtitleEngine::default();
    assert_eq!(engine.load_track(Vec::new()), Ok(0));
    let playhead = Playhead::default();
    let mut changes = engine.active_cue_changes();

    playhead.set(1.0);
    engine.start(playhead.provider());
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert!(drain(&mut changes).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn reloading_hides_the_shown_cue() {
    let engine = SubtitleEngine::default();
    engine.load_text(TRACK, SubtitleFormat::Srt).unwrap();
    let playhead = Playhead::default();
    let mut changes = engine.active_cue_changes();

    playhead.set(1.0);
    engine.start(playhead.provider());
    tokio::time::sleep(Duration::from_millis(100)).await;

    engine
        .load_text("WEBVTT\n\n00:00.500 --> 00:01.500\nC\n", SubtitleFormat::Vtt)
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(
        texts(drain(&mut changes).await),
        vec![Some("A".to_string()), None, Some("C".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn publishes_subtitle_events_on_bus() {
    let bus = EventBus::new(32);
    let mut events = bus.subscribe();
    let engine = SubtitleEngine::with_event_bus(Duration::from_secs(1), bus);
    let playhead = Playhead::default();

    engine.load_text(TRACK, SubtitleFormat::Srt).unwrap();
    playhead.set(0.5);
    engine.start(playhead.provider());
    tokio::time::sleep(Duration::from_millis(100)).await;
    engine.clear_track();

    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Subtitle(SubtitleEvent::TrackLoaded { cue_count: 2 })
    );
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Subtitle(SubtitleEvent::ActiveCueChanged {
            cue: Some(CueSnapshot {
                text: "A".into(),
                start_ms: 0,
                end_ms: 2000
            })
        })
    );
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Subtitle(SubtitleEvent::ActiveCueChanged { cue: None })
    );
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Subtitle(SubtitleEvent::TrackCleared)
    );
}

#[tokio::test]
async fn stream_ends_when_engine_dropped() {
    let engine = SubtitleEngine::default();
    let mut changes = engine.active_cue_changes();
    drop(engine);
    assert_eq!(changes.next().await, None);
}
