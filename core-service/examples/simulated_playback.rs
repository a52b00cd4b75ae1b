//! Plays a fake five-second clip with subtitles and prints every event.
//!
//! ```text
//! RUST_LOG=core_subtitles=debug cargo run -p core-service --example simulated_playback
//! ```

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{EngineEventSink, LogLevel, MediaSource, NativeEngineAdapter, NativeState};
use core_runtime::config::OrchestratorConfig;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::MediaService;
use core_subtitles::SubtitleFormat;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

const CLIP: Duration = Duration::from_secs(5);

const SUBTITLES: &str = "WEBVTT

00:00.500 --> 00:02.000
- Where are we?

00:02.500 --> 00:04.000 align:start
- Somewhere quiet.
";

/// Advances a fake playhead every 250ms while playing.
#[derive(Default)]
struct SimulatedEngine {
    sink: Mutex<Option<EngineEventSink>>,
    playhead: Arc<Mutex<Duration>>,
    clock: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl SimulatedEngine {
    fn sink(&self) -> Option<EngineEventSink> {
        self.sink.lock().clone()
    }

    fn halt(&self) {
        if let Some(clock) = self.clock.lock().take() {
            clock.abort();
        }
    }
}

#[async_trait]
impl NativeEngineAdapter for SimulatedEngine {
    async fn attach(&self, sink: EngineEventSink) -> BridgeResult<()> {
        *self.sink.lock() = Some(sink);
        Ok(())
    }

    async fn release(&self) -> BridgeResult<()> {
        self.halt();
        self.sink.lock().take();
        Ok(())
    }

    async fn set_source(&self, source: Option<MediaSource>) -> BridgeResult<()> {
        *self.playhead.lock() = Duration::ZERO;
        if let (Some(_), Some(sink)) = (source, self.sink()) {
            sink.state_changed(NativeState::Ready);
        }
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        let Some(sink) = self.sink() else {
            return Ok(());
        };
        sink.state_changed(NativeState::Playing);

        let playhead = Arc::clone(&self.playhead);
        let clock = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(250));
            loop {
                interval.tick().await;
                let position = {
                    let mut position = playhead.lock();
                    *position = (*position + Duration::from_millis(250)).min(CLIP);
                    *position
                };
                sink.position_changed(position, CLIP);
                if position >= CLIP {
                    sink.ended();
                    break;
                }
            }
        });
        if let Some(previous) = self.clock.lock().replace(clock) {
            previous.abort();
        }
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.halt();
        if let Some(sink) = self.sink() {
            sink.state_changed(NativeState::Paused);
        }
        Ok(())
    }

    async fn seek_to(&self, position: Duration) -> BridgeResult<()> {
        *self.playhead.lock() = position.min(CLIP);
        if let Some(sink) = self.sink() {
            sink.seek_completed();
        }
        Ok(())
    }

    async fn set_speed(&self, _speed: f64) -> BridgeResult<()> {
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        if let Some(sink) = self.sink() {
            sink.volume_changed(volume);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Info),
    )?;

    let config = OrchestratorConfig::builder()
        .adapter(Arc::new(SimulatedEngine::default()))
        .subtitle_poll_interval(Duration::from_millis(250))
        .auto_play(true)
        .build()?;
    let service = MediaService::new(config).await?;
    let mut events = service.events();

    service
        .update_source(Some(MediaSource::file("/media/demo.mp4")))
        .await;
    let cues = service.load_subtitle_track(SUBTITLES, SubtitleFormat::Vtt)?;
    println!("loaded {cues} cues");

    while let Ok(event) = events.recv().await {
        println!("{:<28} {}", event.description(), serde_json::to_string(&event)?);
        if matches!(
            event,
            core_runtime::CoreEvent::Playback(core_runtime::PlaybackEvent::MediaEnded)
        ) {
            break;
        }
    }

    service.dispose().await;
    Ok(())
}
