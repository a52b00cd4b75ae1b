use crate::error::{CoreError, Result};
use bridge_traits::{MediaSource, PlaybackState};
use core_async::sync::CancellationToken;
use core_playback::{
    MediaMetadata, NowPlaying, PlaybackOrchestrator, PositionSource, SeekOutcome,
};
use core_runtime::config::OrchestratorConfig;
use core_runtime::events::{
    CoreEvent, EventBus, EventStream, PlaybackEvent, Receiver, RecvError,
};
use core_subtitles::{ActiveCueStream, FormatError, SubtitleCue, SubtitleEngine, SubtitleFormat};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Playback plus subtitle synchronization behind one handle.
///
/// Cloning is cheap; every clone drives the same engine. The engine is
/// released by [`MediaService::dispose`] or when the last clone is dropped.
#[derive(Clone)]
pub struct MediaService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    player: PlaybackOrchestrator,
    subtitles: SubtitleEngine,
    events: EventBus,
    lifecycle: CancellationToken,
}

impl MediaService {
    /// Attach to `config.adapter` and start following playback state.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Runtime`] if the configuration is invalid
    /// - [`CoreError::InitializationFailed`] if the engine refuses to attach
    pub async fn new(config: OrchestratorConfig) -> Result<Self> {
        config.validate()?;

        let events = EventBus::new(config.event_buffer_size);
        let player = PlaybackOrchestrator::attach_with_bus(&config, events.clone())
            .await
            .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
        let subtitles =
            SubtitleEngine::with_event_bus(config.subtitle_poll_interval, events.clone());

        let inner = Arc::new(ServiceInner {
            player,
            subtitles,
            lifecycle: CancellationToken::new(),
            events,
        });

        core_async::task::spawn(follow_playback(
            Arc::downgrade(&inner),
            inner.events.subscribe(),
            inner.lifecycle.clone(),
        ));

        info!("Media service ready");
        Ok(Self { inner })
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub async fn play(&self) {
        self.inner.player.play().await;
    }

    pub async fn pause(&self) {
        self.inner.player.pause().await;
    }

    pub async fn stop(&self) {
        self.inner.player.stop().await;
    }

    /// See [`PlaybackOrchestrator::seek`].
    pub async fn seek(&self, target: Duration, cancel: &CancellationToken) -> Result<SeekOutcome> {
        Ok(self.inner.player.seek(target, cancel).await?)
    }

    /// Replace the media item. The current subtitle track belongs to the old
    /// item and is dropped first.
    pub async fn update_source(&self, source: Option<MediaSource>) {
        self.inner.subtitles.clear_track();
        self.inner.player.update_source(source).await;
    }

    // ========================================================================
    // Properties
    // ========================================================================

    pub async fn update_speed(&self, speed: f64) {
        self.inner.player.update_speed(speed).await;
    }

    pub async fn update_volume(&self, volume: f32) {
        self.inner.player.update_volume(volume).await;
    }

    pub async fn update_should_mute(&self, muted: bool) {
        self.inner.player.update_should_mute(muted).await;
    }

    pub async fn update_should_loop_playback(&self, should_loop: bool) {
        self.inner.player.update_should_loop_playback(should_loop).await;
    }

    pub async fn update_should_auto_play(&self, auto_play: bool) {
        self.inner.player.update_should_auto_play(auto_play).await;
    }

    pub async fn update_should_keep_screen_on(&self, keep_screen_on: bool) {
        self.inner
            .player
            .update_should_keep_screen_on(keep_screen_on)
            .await;
    }

    pub fn update_metadata(&self, metadata: MediaMetadata) {
        self.inner.player.update_metadata(metadata);
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.player.state()
    }

    pub fn position(&self) -> Duration {
        self.inner.player.position()
    }

    pub fn duration(&self) -> Duration {
        self.inner.player.duration()
    }

    pub fn now_playing(&self) -> NowPlaying {
        self.inner.player.now_playing()
    }

    pub fn position_source(&self) -> PositionSource {
        self.inner.player.position_source()
    }

    // ========================================================================
    // Subtitles
    // ========================================================================

    /// Parse `raw` and make it the active track. Returns the cue count.
    ///
    /// # Errors
    ///
    /// [`FormatError`] if the document is malformed; the previous track
    /// stays loaded.
    #[instrument(skip(self, raw), fields(bytes = raw.len()))]
    pub fn load_subtitle_track(
        &self,
        raw: &str,
        format: SubtitleFormat,
    ) -> std::result::Result<usize, FormatError> {
        self.inner.subtitles.load_text(raw, format)
    }

    pub fn clear_subtitle_track(&self) {
        self.inner.subtitles.clear_track();
    }

    pub fn active_cue(&self) -> Option<SubtitleCue> {
        self.inner.subtitles.active_cue()
    }

    pub fn active_cue_changes(&self) -> ActiveCueStream {
        self.inner.subtitles.active_cue_changes()
    }

    pub fn is_subtitle_polling(&self) -> bool {
        self.inner.subtitles.is_running()
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Every playback and subtitle event.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.inner.events.subscribe()
    }

    pub fn events(&self) -> EventStream {
        EventStream::new(self.inner.events.subscribe())
    }

    pub fn player(&self) -> &PlaybackOrchestrator {
        &self.inner.player
    }

    pub fn subtitles(&self) -> &SubtitleEngine {
        &self.inner.subtitles
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Stop subtitle polling, drop the track and release the engine.
    /// Idempotent.
    pub async fn dispose(&self) {
        self.inner.lifecycle.cancel();
        // A state change already taken by the follower may still call
        // `start`; a closed engine refuses it.
        self.inner.subtitles.close();
        self.inner.subtitles.clear_track();
        self.inner.player.dispose().await;
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.player.is_disposed()
    }
}

impl std::fmt::Debug for MediaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaService")
            .field("player", &self.inner.player)
            .field("subtitles", &self.inner.subtitles)
            .finish()
    }
}

impl ServiceInner {
    /// Poll subtitles only while there is a playing, paused or buffering item.
    fn follow(&self, state: PlaybackState) {
        match state {
            PlaybackState::Playing | PlaybackState::Paused | PlaybackState::Buffering => {
                if self.lifecycle.is_cancelled() {
                    return;
                }
                let position = self.player.position_source();
                if self.subtitles.start(move || position.position()) {
                    debug!(%state, "Subtitle polling resumed");
                }
            }
            PlaybackState::None
            | PlaybackState::Opening
            | PlaybackState::Stopped
            | PlaybackState::Failed => self.subtitles.stop(),
        }
    }
}

impl Drop for ServiceInner {
    fn drop(&mut self) {
        self.lifecycle.cancel();
    }
}

/// Start and stop subtitle polling as playback state changes.
async fn follow_playback(
    inner: Weak<ServiceInner>,
    mut receiver: Receiver<CoreEvent>,
    lifecycle: CancellationToken,
) {
    loop {
        let received = core_async::select! {
            biased;
            _ = lifecycle.cancelled() => break,
            received = receiver.recv() => received,
        };

        let Some(inner) = inner.upgrade() else {
            break;
        };
        match received {
            Ok(CoreEvent::Playback(PlaybackEvent::StateChanged { current, .. })) => {
                inner.follow(current);
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Playback follower lagged; resyncing");
                inner.follow(inner.player.state());
            }
            Err(RecvError::Closed) => break,
        }
    }
    debug!("Playback follower stopped");
}
