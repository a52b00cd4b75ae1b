//! Scripted engine shared by the orchestrator integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{
    EngineEvent, EngineEventSink, MediaSource, NativeEngineAdapter, NativeState, PlaybackState,
};
use core_playback::PlaybackOrchestrator;
use core_runtime::config::{OrchestratorConfig, OrchestratorConfigBuilder};
use core_runtime::events::{CoreEvent, EventStream, PlaybackEvent};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Attach,
    Release,
    SetSource(Option<MediaSource>),
    Play,
    Pause,
    Stop,
    SeekTo(Duration),
    SetSpeed(f64),
    SetVolume(f32),
    SetLooping(bool),
    SetKeepScreenOn(bool),
}

/// How the engine answers `seek_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekReply {
    /// Fire `SeekCompleted` after the given delay.
    ConfirmAfter(Duration),
    /// Never confirm.
    Silent,
}

/// Records every command and lets the test fire callbacks.
pub struct ScriptedEngine {
    sink: Mutex<Option<EngineEventSink>>,
    calls: Mutex<Vec<Call>>,
    has_stop: bool,
    seek_reply: SeekReply,
    failing_play: bool,
    seeks_in_flight: Arc<AtomicUsize>,
    max_seeks_in_flight: Arc<AtomicUsize>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self {
            sink: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            has_stop: true,
            seek_reply: SeekReply::ConfirmAfter(Duration::ZERO),
            failing_play: false,
            seeks_in_flight: Arc::new(AtomicUsize::new(0)),
            max_seeks_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ScriptedEngine {
    pub fn without_stop(mut self) -> Self {
        self.has_stop = false;
        self
    }

    pub fn with_seek_reply(mut self, reply: SeekReply) -> Self {
        self.seek_reply = reply;
        self
    }

    pub fn with_failing_play(mut self) -> Self {
        self.failing_play = true;
        self
    }

    pub fn emit(&self, event: EngineEvent) {
        let sink = self.sink.lock().clone().expect("engine not attached");
        assert!(sink.emit(event), "orchestrator gone");
    }

    pub fn native(&self, state: NativeState) {
        self.emit(EngineEvent::StateChanged(state));
    }

    pub fn tick(&self, position_ms: u64, duration_ms: u64) {
        self.emit(EngineEvent::PositionChanged {
            position: Duration::from_millis(position_ms),
            duration: Duration::from_millis(duration_ms),
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Calls recorded after attach-time setup.
    pub fn commands(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| {
                !matches!(
                    call,
                    Call::Attach
                        | Call::SetLooping(_)
                        | Call::SetKeepScreenOn(_)
                        | Call::SetSpeed(_)
                        | Call::SetVolume(_)
                )
            })
            .collect()
    }

    pub fn max_seeks_in_flight(&self) -> usize {
        self.max_seeks_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl NativeEngineAdapter for ScriptedEngine {
    async fn attach(&self, sink: EngineEventSink) -> Result<()> {
        self.record(Call::Attach);
        *self.sink.lock() = Some(sink);
        Ok(())
    }

    async fn release(&self) -> Result<()> {
        self.record(Call::Release);
        self.sink.lock().take();
        Ok(())
    }

    async fn set_source(&self, source: Option<MediaSource>) -> Result<()> {
        self.record(Call::SetSource(source));
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        self.record(Call::Play);
        if self.failing_play {
            return Err(BridgeError::OperationFailed("decoder unavailable".into()));
        }
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.record(Call::Pause);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if !self.has_stop {
            return Err(BridgeError::NotAvailable("stop".into()));
        }
        self.record(Call::Stop);
        Ok(())
    }

    async fn seek_to(&self, position: Duration) -> Result<()> {
        self.record(Call::SeekTo(position));
        let now = self.seeks_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seeks_in_flight.fetch_max(now, Ordering::SeqCst);

        if let SeekReply::ConfirmAfter(delay) = self.seek_reply {
            let sink = self.sink.lock().clone();
            let in_flight = Arc::clone(&self.seeks_in_flight);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                if let Some(sink) = sink {
                    sink.seek_completed();
                }
            });
        }
        Ok(())
    }

    async fn set_speed(&self, speed: f64) -> Result<()> {
        self.record(Call::SetSpeed(speed));
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> Result<()> {
        self.record(Call::SetVolume(volume));
        Ok(())
    }

    async fn set_looping(&self, looping: bool) -> Result<()> {
        self.record(Call::SetLooping(looping));
        Ok(())
    }

    async fn set_keep_screen_on(&self, keep_screen_on: bool) -> Result<()> {
        self.record(Call::SetKeepScreenOn(keep_screen_on));
        Ok(())
    }
}

pub fn config(engine: Arc<ScriptedEngine>) -> OrchestratorConfigBuilder {
    OrchestratorConfig::builder().adapter(engine)
}

pub async fn attach(engine: Arc<ScriptedEngine>) -> PlaybackOrchestrator {
    attach_with(config(engine)).await
}

pub async fn attach_with(builder: OrchestratorConfigBuilder) -> PlaybackOrchestrator {
    let config = builder.build().unwrap();
    PlaybackOrchestrator::attach(&config).await.unwrap()
}

/// Next `StateChanged` as `(previous, current)`.
pub async fn next_transition(stream: &mut EventStream) -> (PlaybackState, PlaybackState) {
    let event = tokio::time::timeout(Duration::from_secs(5), stream.recv())
        .await
        .expect("no state change observed")
        .unwrap();
    match event {
        CoreEvent::Playback(PlaybackEvent::StateChanged { previous, current }) => {
            (previous, current)
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

/// Next event matching `predicate`.
pub async fn next_matching<F>(stream: &mut EventStream, predicate: F) -> CoreEvent
where
    F: Fn(&CoreEvent) -> bool,
{
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), stream.recv())
            .await
            .expect("event not observed")
            .unwrap();
        if predicate(&event) {
            return event;
        }
    }
}
