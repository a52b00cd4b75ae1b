//! # Playback Orchestrator
//!
//! Presents one playback contract over any [`NativeEngineAdapter`].
//!
//! ## Overview
//!
//! ```text
//!  caller ──play/pause/seek──> PlaybackOrchestrator ──commands──> adapter
//!                                   │     ▲                          │
//!                                   │     └──── EngineEvent pump <───┘
//!                                   ▼
//!                              EventBus ──> observers
//! ```
//!
//! All session mutation happens under one mutex, whether it comes from a
//! caller's command or from the pump task draining engine callbacks. Events
//! are published while that mutex is held, so observers see them in the
//! order the mutations happened. Engine calls are always made after the
//! mutex is released.
//!
//! Every native seek holds the [`SeekCoordinator`] slot, including the
//! rewinds behind `stop`, play-after-stop and looping, so an engine never
//! sees two seeks at once.
//!
//! Commands never return adapter errors. A rejected command moves the
//! session to `Failed` and publishes `MediaFailed`; every observer sees the
//! same failure. Commands issued with no source loaded, or after
//! [`PlaybackOrchestrator::dispose`], are silently ignored.
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::PlaybackOrchestrator;
//! use core_runtime::config::OrchestratorConfig;
//! use bridge_traits::MediaSource;
//!
//! let config = OrchestratorConfig::builder().adapter(engine).build()?;
//! let player = PlaybackOrchestrator::attach(&config).await?;
//!
//! player.update_source(Some(MediaSource::file("/media/clip.mp4"))).await;
//! player.play().await;
//! ```

use crate::error::{PlaybackError, Result};
use crate::metadata::{MediaMetadata, NowPlaying};
use crate::position::PositionSource;
use crate::seek::{SeekCoordinator, SeekOutcome};
use crate::session::{millis, Effect, PlaybackSession, Update};
use bridge_traits::{
    BridgeError, EngineEvent, EngineEventReceiver, EngineEventSink, EngineFailure, MediaSource,
    NativeEngineAdapter, PlaybackState,
};
use core_async::sync::CancellationToken;
use core_runtime::config::OrchestratorConfig;
use core_runtime::events::{CoreEvent, EventBus, EventStream, PlaybackEvent, Receiver};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Drives one native engine on behalf of the caller.
pub struct PlaybackOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    adapter: Arc<dyn NativeEngineAdapter>,
    session: Mutex<PlaybackSession>,
    seeks: SeekCoordinator,
    events: EventBus,
    shutdown: CancellationToken,
    disposed: AtomicBool,
}

impl PlaybackOrchestrator {
    /// Attach to the configured engine with a private event bus.
    pub async fn attach(config: &OrchestratorConfig) -> Result<Self> {
        Self::attach_with_bus(config, EventBus::new(config.event_buffer_size)).await
    }

    /// Attach to the configured engine, publishing onto `events`.
    ///
    /// Registers the callback sink with the adapter, pushes the initial
    /// settings, and starts the callback pump on the current runtime.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::Adapter`] if the engine refuses the sink or the
    /// initial settings.
    pub async fn attach_with_bus(config: &OrchestratorConfig, events: EventBus) -> Result<Self> {
        let adapter = Arc::clone(&config.adapter);
        let (sink, receiver) = EngineEventSink::channel();
        adapter.attach(sink).await?;

        let defaults = &config.defaults;
        adapter.set_volume(defaults.volume).await?;
        adapter.set_looping(defaults.should_loop).await?;
        adapter.set_keep_screen_on(defaults.keep_screen_on).await?;
        if defaults.speed > 0.0 {
            adapter.set_speed(defaults.speed).await?;
        }

        let inner = Arc::new(Inner {
            adapter,
            session: Mutex::new(PlaybackSession::new(defaults)),
            seeks: SeekCoordinator::new(config.seek_timeout, config.seek_timeout_policy),
            events,
            shutdown: CancellationToken::new(),
            disposed: AtomicBool::new(false),
        });

        core_async::task::spawn(pump(
            Arc::downgrade(&inner),
            receiver,
            inner.shutdown.clone(),
        ));

        info!(
            seek_timeout_s = config.seek_timeout.as_secs(),
            policy = ?config.seek_timeout_policy,
            "Playback orchestrator attached"
        );
        Ok(Self { inner })
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub async fn play(&self) {
        let previous = match self.inner.transport(PlaybackSession::play) {
            Ok(previous) => previous,
            Err(err) => {
                debug!(%err, "play ignored");
                return;
            }
        };

        if previous == PlaybackState::Stopped && !self.inner.rewind().await {
            return;
        }
        if let Err(err) = self.inner.adapter.play().await {
            self.inner.fail(err);
        }
    }

    pub async fn pause(&self) {
        let previous = match self.inner.transport(PlaybackSession::pause) {
            Ok(previous) => previous,
            Err(err) => {
                debug!(%err, "pause ignored");
                return;
            }
        };

        if previous == PlaybackState::Stopped {
            return;
        }
        if let Err(err) = self.inner.adapter.pause().await {
            self.inner.fail(err);
        }
    }

    /// Stop and rewind. The session reports `Stopped` at position zero
    /// whether or not the engine has a stop primitive.
    pub async fn stop(&self) {
        let previous = match self.inner.transport(PlaybackSession::stop) {
            Ok(previous) => previous,
            Err(err) => {
                debug!(%err, "stop ignored");
                return;
            }
        };

        if previous == PlaybackState::Stopped {
            return;
        }

        match self.inner.adapter.stop().await {
            Ok(()) => {}
            Err(BridgeError::NotAvailable(_)) => {
                debug!("Engine has no stop primitive; pausing and rewinding");
                if let Err(err) = self.inner.adapter.pause().await {
                    self.inner.fail(err);
                    return;
                }
                self.inner.rewind().await;
            }
            Err(err) => self.inner.fail(err),
        }
    }

    /// Seek to `target` and wait for the engine to settle.
    ///
    /// Returns [`SeekOutcome::Skipped`] with no source loaded or after
    /// dispose, and [`SeekOutcome::Failed`] if the engine rejected the
    /// request (reported through `MediaFailed`).
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::Cancelled`] if `cancel` fires while waiting
    /// - [`PlaybackError::SeekTimeout`] under the strict timeout policy
    /// - [`PlaybackError::Disposed`] if the orchestrator is disposed mid-wait
    #[instrument(skip(self, cancel), fields(target_ms = millis(target)))]
    pub async fn seek(&self, target: Duration, cancel: &CancellationToken) -> Result<SeekOutcome> {
        if self.inner.is_disposed() || !self.inner.session.lock().accepts_transport() {
            debug!("seek skipped");
            return Ok(SeekOutcome::Skipped);
        }

        let adapter = Arc::clone(&self.inner.adapter);
        let result = self
            .inner
            .seeks
            .run(target, cancel, move |position| async move {
                adapter.seek_to(position).await
            })
            .await;

        match result {
            Ok(outcome) => {
                if outcome.is_settled() {
                    self.inner.emit(PlaybackEvent::SeekCompleted {
                        position_ms: millis(target),
                    });
                }
                Ok(outcome)
            }
            Err(PlaybackError::Adapter(err)) => {
                self.inner.fail(err);
                Ok(SeekOutcome::Failed)
            }
            Err(err) => Err(err),
        }
    }

    /// Replace the media item, or clear it with `None`.
    ///
    /// A new source always passes through `Opening`; auto-play is applied
    /// only once the engine reports it is ready.
    #[instrument(skip_all, fields(clearing = source.is_none()))]
    pub async fn update_source(&self, source: Option<MediaSource>) {
        if self.inner.is_disposed() {
            return;
        }

        let clearing = source.is_none();
        let pushed = source.clone();
        self.inner.apply(|session| session.load_source(source));

        if let Err(err) = self.inner.adapter.set_source(pushed).await {
            if clearing {
                warn!(%err, "Engine failed to clear its source");
            } else {
                self.inner.fail(err);
            }
        }
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Set the playback rate. Zero or negative pauses; returning to a
    /// positive rate from there resumes.
    pub async fn update_speed(&self, speed: f64) {
        if self.inner.is_disposed() {
            return;
        }
        if !speed.is_finite() {
            warn!(speed, "Ignoring non-finite speed");
            return;
        }

        let previous = self.inner.session.lock().set_speed(speed);
        if speed <= 0.0 {
            self.pause().await;
            return;
        }

        if let Err(err) = self.inner.adapter.set_speed(speed).await {
            self.inner.fail(err);
            return;
        }
        if previous <= 0.0 {
            self.play().await;
        }
    }

    pub async fn update_volume(&self, volume: f32) {
        if self.inner.is_disposed() {
            return;
        }
        let push = {
            let mut session = self.inner.session.lock();
            let (push, update) = session.set_volume(volume);
            self.inner.publish(update.events);
            push
        };
        if let Some(level) = push {
            if let Err(err) = self.inner.adapter.set_volume(level).await {
                self.inner.fail(err);
            }
        }
    }

    pub async fn update_should_mute(&self, muted: bool) {
        if self.inner.is_disposed() {
            return;
        }
        let push = {
            let mut session = self.inner.session.lock();
            let (push, update) = session.set_muted(muted);
            self.inner.publish(update.events);
            push
        };
        if let Some(level) = push {
            if let Err(err) = self.inner.adapter.set_volume(level).await {
                self.inner.fail(err);
            }
        }
    }

    pub async fn update_should_loop_playback(&self, should_loop: bool) {
        if self.inner.is_disposed() {
            return;
        }
        self.inner.session.lock().set_should_loop(should_loop);
        if let Err(err) = self.inner.adapter.set_looping(should_loop).await {
            self.inner.fail(err);
        }
    }

    /// Takes effect the next time the engine reports ready for a new source.
    pub async fn update_should_auto_play(&self, auto_play: bool) {
        if self.inner.is_disposed() {
            return;
        }
        self.inner.session.lock().set_should_auto_play(auto_play);
    }

    pub async fn update_should_keep_screen_on(&self, keep_screen_on: bool) {
        if self.inner.is_disposed() {
            return;
        }
        self.inner
            .session
            .lock()
            .set_should_keep_screen_on(keep_screen_on);
        if let Err(err) = self.inner.adapter.set_keep_screen_on(keep_screen_on).await {
            self.inner.fail(err);
        }
    }

    pub fn update_metadata(&self, metadata: MediaMetadata) {
        if self.inner.is_disposed() {
            return;
        }
        self.inner.session.lock().set_metadata(metadata);
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn state(&self) -> PlaybackState {
        self.inner.session.lock().state()
    }

    pub fn position(&self) -> Duration {
        self.inner.session.lock().position()
    }

    pub fn duration(&self) -> Duration {
        self.inner.session.lock().duration()
    }

    pub fn speed(&self) -> f64 {
        self.inner.session.lock().speed()
    }

    /// Level the listener hears: zero while muted.
    pub fn effective_volume(&self) -> f32 {
        self.inner.session.lock().volume().effective_volume()
    }

    pub fn volume(&self) -> f32 {
        self.inner.session.lock().volume().volume()
    }

    pub fn is_muted(&self) -> bool {
        self.inner.session.lock().volume().is_muted()
    }

    pub fn should_loop(&self) -> bool {
        self.inner.session.lock().should_loop()
    }

    pub fn now_playing(&self) -> NowPlaying {
        self.inner.session.lock().now_playing()
    }

    /// Lock-free reader of the latest position report.
    pub fn position_source(&self) -> PositionSource {
        self.inner.session.lock().position_source()
    }

    /// Every event this orchestrator publishes.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.inner.events.subscribe()
    }

    /// `StateChanged` events only.
    pub fn state_changes(&self) -> EventStream {
        EventStream::new(self.subscribe()).filter(|event| {
            matches!(
                event,
                CoreEvent::Playback(PlaybackEvent::StateChanged { .. })
            )
        })
    }

    /// `PositionChanged` events only.
    pub fn position_changes(&self) -> EventStream {
        EventStream::new(self.subscribe()).filter(|event| {
            matches!(
                event,
                CoreEvent::Playback(PlaybackEvent::PositionChanged { .. })
            )
        })
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.events
    }

    /// Returns `true` while a seek owns the engine.
    pub fn is_seeking(&self) -> bool {
        self.inner.seeks.is_busy()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Stop the callback pump, fail pending seek waits with
    /// [`PlaybackError::Disposed`] and release the engine. Idempotent.
    pub async fn dispose(&self) {
        if !self.inner.shut_down() {
            return;
        }
        if let Err(err) = self.inner.adapter.release().await {
            warn!(%err, "Engine release failed");
        }
        info!("Playback orchestrator disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}

impl Drop for PlaybackOrchestrator {
    fn drop(&mut self) {
        self.inner.shut_down();
    }
}

impl std::fmt::Debug for PlaybackOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.inner.session.lock();
        f.debug_struct("PlaybackOrchestrator")
            .field("state", &session.state())
            .field("position", &session.position())
            .field("disposed", &self.inner.is_disposed())
            .finish()
    }
}

impl Inner {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Returns `true` for the call that actually shut down.
    fn shut_down(&self) -> bool {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.shutdown.cancel();
        self.seeks.close();
        true
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is not an error.
        let _ = self.events.emit(CoreEvent::Playback(event));
    }

    fn publish(&self, events: Vec<PlaybackEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    /// Mutate the session and publish the resulting events under the lock.
    fn apply<F>(&self, mutate: F) -> Vec<Effect>
    where
        F: FnOnce(&mut PlaybackSession) -> Update,
    {
        let mut session = self.session.lock();
        let update = mutate(&mut session);
        self.publish(update.events);
        update.effects
    }

    /// Apply a transport command if the session has a usable source.
    /// Returns the state before the command.
    fn transport<F>(&self, command: F) -> Result<PlaybackState>
    where
        F: FnOnce(&mut PlaybackSession) -> Update,
    {
        if self.is_disposed() {
            return Err(PlaybackError::Disposed);
        }
        let mut session = self.session.lock();
        if !session.accepts_transport() {
            return Err(PlaybackError::NotReady);
        }
        let previous = session.state();
        let update = command(&mut session);
        self.publish(update.events);
        Ok(previous)
    }

    fn fail(&self, err: BridgeError) {
        warn!(%err, "Engine rejected command");
        self.apply(|session| session.fail(EngineFailure::from(err)));
    }

    /// Rewind to zero through the seek slot, after any seek already in
    /// flight. Returns `false` if the engine rejected the rewind or the
    /// orchestrator was disposed while waiting.
    async fn rewind(&self) -> bool {
        let adapter = Arc::clone(&self.adapter);
        let result = self
            .seeks
            .run(Duration::ZERO, &CancellationToken::new(), move |position| async move {
                adapter.seek_to(position).await
            })
            .await;

        match result {
            Ok(_) => true,
            Err(PlaybackError::Adapter(err)) => {
                self.fail(err);
                false
            }
            Err(PlaybackError::SeekTimeout(deadline)) => {
                warn!(deadline_s = deadline.as_secs(), "Rewind not confirmed; continuing");
                true
            }
            Err(err) => {
                debug!(%err, "Rewind abandoned");
                false
            }
        }
    }

    fn handle_engine_event(&self, event: EngineEvent) -> Vec<Effect> {
        match event {
            EngineEvent::SeekCompleted => {
                self.seeks.complete();
                Vec::new()
            }
            EngineEvent::StateChanged(native) => {
                debug!(?native, "Engine state");
                self.apply(|session| session.on_native_state(native))
            }
            EngineEvent::PositionChanged { position, duration } => {
                self.apply(|session| session.on_position(position, duration))
            }
            EngineEvent::VolumeChanged(volume) => {
                self.apply(|session| session.on_engine_volume(volume))
            }
            EngineEvent::Ended => self.apply(PlaybackSession::on_ended),
            EngineEvent::Failed(failure) => self.apply(|session| session.fail(failure)),
        }
    }

    async fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Play => {
                    if let Err(err) = self.adapter.play().await {
                        self.fail(err);
                        return;
                    }
                }
                Effect::SeekToStart => {
                    if !self.rewind().await {
                        return;
                    }
                }
            }
        }
    }
}

/// Drain engine callbacks until shutdown, the adapter drops its sink, or
/// the orchestrator is dropped.
async fn pump(inner: Weak<Inner>, mut receiver: EngineEventReceiver, shutdown: CancellationToken) {
    loop {
        let event = core_async::select! {
            biased;
            _ = shutdown.cancelled() => break,
            event = receiver.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        let Some(inner) = inner.upgrade() else {
            break;
        };
        if inner.is_disposed() {
            break;
        }
        let effects = inner.handle_engine_event(event);
        if effects.contains(&Effect::SeekToStart) {
            // The rewind waits on a SeekCompleted that only this loop delivers.
            core_async::task::spawn(async move { inner.run_effects(effects).await });
        } else {
            inner.run_effects(effects).await;
        }
    }
    debug!("Engine event pump stopped");
}
