//! The playback session aggregate.
//!
//! [`PlaybackSession`] is plain data plus the rules for mutating it. It never
//! talks to the engine: every mutation returns an [`Update`] listing the
//! events to publish and the follow-up engine commands to issue, and the
//! orchestrator carries those out after releasing the session lock.

use crate::metadata::{MediaMetadata, NowPlaying};
use crate::position::{PositionPublisher, PositionSnapshot, PositionSource};
use crate::state::{next_state, TransitionFlags};
use crate::volume::VolumeShadow;
use bridge_traits::{EngineFailure, MediaSource, NativeState, PlaybackState};
use core_runtime::config::PlaybackDefaults;
use core_runtime::events::PlaybackEvent;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Engine command the orchestrator must issue after applying an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Play,
    SeekToStart,
}

/// Result of one session mutation.
#[derive(Debug, Default, PartialEq)]
pub struct Update {
    pub events: Vec<PlaybackEvent>,
    pub effects: Vec<Effect>,
}

impl Update {
    fn event(&mut self, event: PlaybackEvent) {
        self.events.push(event);
    }

    fn effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.effects.is_empty()
    }
}

/// Saturating conversion for event payloads.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Mutable playback state, owned by one orchestrator.
#[derive(Debug)]
pub struct PlaybackSession {
    state: PlaybackState,
    source: Option<MediaSource>,
    position: Duration,
    duration: Duration,
    speed: f64,
    volume: VolumeShadow,
    should_loop: bool,
    should_auto_play: bool,
    should_keep_screen_on: bool,
    play_when_ready: bool,
    metadata: MediaMetadata,
    publisher: PositionPublisher,
}

impl PlaybackSession {
    pub fn new(defaults: &PlaybackDefaults) -> Self {
        Self {
            state: PlaybackState::None,
            source: None,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            speed: defaults.speed,
            volume: VolumeShadow::new(defaults.volume),
            should_loop: defaults.should_loop,
            should_auto_play: defaults.auto_play,
            should_keep_screen_on: defaults.keep_screen_on,
            play_when_ready: false,
            metadata: MediaMetadata::default(),
            publisher: PositionPublisher::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn volume(&self) -> &VolumeShadow {
        &self.volume
    }

    pub fn should_loop(&self) -> bool {
        self.should_loop
    }

    pub fn should_auto_play(&self) -> bool {
        self.should_auto_play
    }

    pub fn should_keep_screen_on(&self) -> bool {
        self.should_keep_screen_on
    }

    pub fn play_when_ready(&self) -> bool {
        self.play_when_ready
    }

    /// Returns `true` if playback commands should reach the engine.
    pub fn accepts_transport(&self) -> bool {
        !matches!(self.state, PlaybackState::None | PlaybackState::Failed)
    }

    pub fn position_source(&self) -> PositionSource {
        self.publisher.source()
    }

    pub fn now_playing(&self) -> NowPlaying {
        NowPlaying {
            metadata: self.metadata.clone(),
            state: self.state,
            position: self.position,
            duration: self.duration,
            speed: self.speed,
        }
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn set_state(&mut self, next: PlaybackState, update: &mut Update) {
        if next == self.state {
            return;
        }
        let previous = self.state;
        self.state = next;
        info!(from = %previous, to = %next, "Playback state changed");
        update.event(PlaybackEvent::StateChanged {
            previous,
            current: next,
        });
    }

    fn set_position(&mut self, position: Duration, duration: Duration, update: &mut Update) {
        if position == self.position && duration == self.duration {
            return;
        }
        self.position = position;
        self.duration = duration;
        self.publisher.publish(PositionSnapshot { position, duration });
        update.event(PlaybackEvent::PositionChanged {
            position_ms: millis(position),
            duration_ms: millis(duration),
        });
    }

    fn volume_event(&self) -> PlaybackEvent {
        PlaybackEvent::VolumeChanged {
            volume: self.volume.volume(),
            muted: self.volume.is_muted(),
        }
    }

    // ========================================================================
    // User commands
    // ========================================================================

    /// Replace (or clear) the media source.
    pub fn load_source(&mut self, source: Option<MediaSource>) -> Update {
        let mut update = Update::default();
        let description = source.as_ref().map(ToString::to_string);

        match source {
            Some(source) => {
                self.source = Some(source);
                self.play_when_ready = self.should_auto_play;
                self.set_state(PlaybackState::Opening, &mut update);
            }
            None => {
                self.source = None;
                self.play_when_ready = false;
                self.set_state(PlaybackState::None, &mut update);
            }
        }

        update.event(PlaybackEvent::SourceChanged {
            source: description,
        });
        self.set_position(Duration::ZERO, Duration::ZERO, &mut update);
        update
    }

    pub fn play(&mut self) -> Update {
        let mut update = Update::default();
        self.play_when_ready = true;
        if matches!(self.state, PlaybackState::Paused | PlaybackState::Stopped) {
            self.set_state(PlaybackState::Playing, &mut update);
        }
        update
    }

    pub fn pause(&mut self) -> Update {
        let mut update = Update::default();
        self.play_when_ready = false;
        if self.state == PlaybackState::Playing {
            self.set_state(PlaybackState::Paused, &mut update);
        }
        update
    }

    pub fn stop(&mut self) -> Update {
        let mut update = Update::default();
        self.play_when_ready = false;
        self.set_state(PlaybackState::Stopped, &mut update);
        let duration = self.duration;
        self.set_position(Duration::ZERO, duration, &mut update);
        update
    }

    /// Record a new speed. Returns the previous one.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        std::mem::replace(&mut self.speed, speed)
    }

    /// Returns the level to push to the engine, if any.
    pub fn set_volume(&mut self, volume: f32) -> (Option<f32>, Update) {
        let push = self.volume.set_volume(volume);
        let mut update = Update::default();
        update.event(self.volume_event());
        (push, update)
    }

    /// Returns the level to push to the engine, if any.
    pub fn set_muted(&mut self, muted: bool) -> (Option<f32>, Update) {
        let was_muted = self.volume.is_muted();
        let push = self.volume.set_muted(muted);
        let mut update = Update::default();
        if was_muted != muted {
            update.event(self.volume_event());
        }
        (push, update)
    }

    pub fn set_should_loop(&mut self, should_loop: bool) {
        self.should_loop = should_loop;
    }

    pub fn set_should_auto_play(&mut self, auto_play: bool) {
        self.should_auto_play = auto_play;
        if self.state == PlaybackState::Opening {
            self.play_when_ready = auto_play;
        }
    }

    pub fn set_should_keep_screen_on(&mut self, keep_screen_on: bool) {
        self.should_keep_screen_on = keep_screen_on;
    }

    pub fn set_metadata(&mut self, metadata: MediaMetadata) {
        self.metadata = metadata;
    }

    /// Move to `Failed`. Ignored when no source is loaded.
    pub fn fail(&mut self, failure: EngineFailure) -> Update {
        let mut update = Update::default();
        if self.state == PlaybackState::None {
            warn!(error = %failure, "Engine failure with no source loaded; ignoring");
            return update;
        }
        warn!(error = %failure, "Playback failed");
        self.play_when_ready = false;
        self.set_state(PlaybackState::Failed, &mut update);
        update.event(PlaybackEvent::MediaFailed {
            message: failure.message,
            code: failure.code,
        });
        update
    }

    // ========================================================================
    // Engine callbacks
    // ========================================================================

    pub fn on_native_state(&mut self, native: NativeState) -> Update {
        let mut update = Update::default();
        let flags = TransitionFlags {
            play_when_ready: self.play_when_ready,
        };

        let Some(next) = next_state(self.state, native, flags) else {
            debug!(state = %self.state, ?native, "Native state ignored");
            return update;
        };

        if self.state == PlaybackState::Opening && next == PlaybackState::Playing {
            update.effect(Effect::Play);
        }
        self.set_state(next, &mut update);
        update
    }

    pub fn on_position(&mut self, position: Duration, duration: Duration) -> Update {
        let mut update = Update::default();
        if matches!(
            self.state,
            PlaybackState::None | PlaybackState::Stopped | PlaybackState::Failed
        ) {
            trace!(state = %self.state, "Position tick ignored");
            return update;
        }
        self.set_position(position, duration, &mut update);
        update
    }

    pub fn on_engine_volume(&mut self, volume: f32) -> Update {
        let mut update = Update::default();
        if self.volume.on_engine_volume(volume) {
            update.event(self.volume_event());
        }
        update
    }

    pub fn on_ended(&mut self) -> Update {
        let mut update = Update::default();
        if !matches!(
            self.state,
            PlaybackState::Playing | PlaybackState::Paused | PlaybackState::Buffering
        ) {
            debug!(state = %self.state, "End of media ignored");
            return update;
        }

        let duration = self.duration;
        if self.should_loop {
            debug!("End of media; looping");
            self.play_when_ready = true;
            self.set_state(PlaybackState::Playing, &mut update);
            self.set_position(Duration::ZERO, duration, &mut update);
            update.effect(Effect::SeekToStart);
            update.effect(Effect::Play);
        } else {
            self.play_when_ready = false;
            self.set_state(PlaybackState::Stopped, &mut update);
            self.set_position(Duration::ZERO, duration, &mut update);
            update.event(PlaybackEvent::MediaEnded);
        }
        update
    }
}
