//! Native engine bridge and its inbound callback channel.
//!
//! Native media engines expose playback through asynchronous, callback-based
//! APIs with different timing, error and state-reporting semantics. This
//! module narrows all of them down to one command trait,
//! [`NativeEngineAdapter`], and one event vocabulary, [`EngineEvent`].
//!
//! Adapters never mutate orchestrator state. They push every observation into
//! the [`EngineEventSink`] handed to them in [`NativeEngineAdapter::attach`];
//! the orchestrator drains the matching [`EngineEventReceiver`] from a single
//! task, which is the only place playback state is derived from the engine.

use crate::error::{BridgeError, Result};
use core_async::sync::mpsc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Media item handed to the native engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// File on the local filesystem.
    File { path: PathBuf },
    /// Remote or platform URI (`https://`, `content://`, `ms-appx://`).
    Uri {
        uri: String,
        headers: HashMap<String, String>,
    },
    /// Asset bundled with the host application.
    Resource { name: String },
}

impl MediaSource {
    /// File source.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        MediaSource::File { path: path.into() }
    }

    /// URI source without extra request headers.
    pub fn uri(uri: impl Into<String>) -> Self {
        MediaSource::Uri {
            uri: uri.into(),
            headers: HashMap::new(),
        }
    }

    /// Bundled resource source.
    pub fn resource(name: impl Into<String>) -> Self {
        MediaSource::Resource { name: name.into() }
    }

    /// Returns `true` if the engine has to fetch the media over the network.
    pub fn is_remote(&self) -> bool {
        match self {
            MediaSource::Uri { uri, .. } => {
                uri.starts_with("http://") || uri.starts_with("https://")
            }
            _ => false,
        }
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::File { path } => write!(f, "file:{}", path.display()),
            // Queries and fragments frequently carry signed tokens.
            MediaSource::Uri { uri, .. } => {
                let end = uri.find(['?', '#']).unwrap_or(uri.len());
                write!(f, "{}", &uri[..end])
            }
            MediaSource::Resource { name } => write!(f, "resource:{}", name),
        }
    }
}

/// Engine-side state codes, already normalised from the platform's own enum.
///
/// Several native codes collapse into one variant (ExoPlayer `STATE_IDLE`
/// and AVPlayer `.unknown` both become [`NativeState::NotReady`]); the
/// orchestrator maps these onto its public state with a transition table, not
/// a passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeState {
    /// Engine has no media or has not started preparing it.
    NotReady,
    /// Engine is fetching or decoding ahead and cannot render yet.
    Buffering,
    /// Engine can render immediately when asked to.
    Ready,
    /// Engine is rendering.
    Playing,
    /// Engine is holding the current frame.
    Paused,
}

/// Externally visible playback lifecycle state.
///
/// `None` is the only legal state before a source is set. `Failed` is terminal
/// until a new source is set. A fresh source always passes through `Opening`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    None,
    Opening,
    Buffering,
    Playing,
    Paused,
    Stopped,
    Failed,
}

impl PlaybackState {
    /// States in which position and duration are meaningful.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            PlaybackState::Playing | PlaybackState::Paused | PlaybackState::Buffering
        )
    }

    /// Returns `true` if a media source is loaded, failed or not.
    pub fn has_source(&self) -> bool {
        !matches!(self, PlaybackState::None)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Unrecoverable failure reported by the native engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFailure {
    /// Human-readable description.
    pub message: String,
    /// Machine-readable platform code, when the engine supplies one.
    pub code: Option<String>,
}

impl EngineFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl From<BridgeError> for EngineFailure {
    fn from(err: BridgeError) -> Self {
        EngineFailure::new(err.to_string())
    }
}

/// Callback observed from the native engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Engine moved to a new native state.
    StateChanged(NativeState),
    /// Periodic position/duration report.
    PositionChanged { position: Duration, duration: Duration },
    /// Engine-reported output volume, including echoes of our own pushes.
    VolumeChanged(f32),
    /// The last issued seek finished. Fired at most once per seek.
    SeekCompleted,
    /// Playback reached the end of the media item.
    Ended,
    /// Engine hit an unrecoverable error.
    Failed(EngineFailure),
}

/// Receiving half of the engine callback channel.
pub type EngineEventReceiver = mpsc::UnboundedReceiver<EngineEvent>;

/// Sending half of the engine callback channel.
///
/// Unbounded so that a native callback thread never blocks on the core.
#[derive(Debug, Clone)]
pub struct EngineEventSink {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineEventSink {
    /// Create a connected sink/receiver pair.
    pub fn channel() -> (Self, EngineEventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Deliver an event. Returns `false` once the orchestrator has been
    /// disposed and the receiver dropped.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn state_changed(&self, state: NativeState) -> bool {
        self.emit(EngineEvent::StateChanged(state))
    }

    pub fn position_changed(&self, position: Duration, duration: Duration) -> bool {
        self.emit(EngineEvent::PositionChanged { position, duration })
    }

    pub fn volume_changed(&self, volume: f32) -> bool {
        self.emit(EngineEvent::VolumeChanged(volume))
    }

    pub fn seek_completed(&self) -> bool {
        self.emit(EngineEvent::SeekCompleted)
    }

    pub fn ended(&self) -> bool {
        self.emit(EngineEvent::Ended)
    }

    pub fn failed(&self, failure: EngineFailure) -> bool {
        self.emit(EngineEvent::Failed(failure))
    }

    /// Returns `true` if the orchestrator side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Trait for platform-specific adapters that drive a native media engine.
///
/// Every command is fire-and-forget from the orchestrator's point of view: a
/// successful return only means the engine accepted the request. The outcome
/// arrives later as an [`EngineEvent`]. `seek_to` in particular must be
/// followed by exactly one [`EngineEvent::SeekCompleted`] once the engine
/// settles, though the orchestrator tolerates engines that omit it.
#[async_trait::async_trait]
pub trait NativeEngineAdapter: Send + Sync {
    /// Register the sink that receives all later callbacks.
    async fn attach(&self, sink: EngineEventSink) -> Result<()>;

    /// Release native resources. No callbacks may be emitted afterwards.
    async fn release(&self) -> Result<()>;

    /// Replace the current media item, or clear it with `None`.
    async fn set_source(&self, source: Option<MediaSource>) -> Result<()>;

    /// Begin or resume rendering.
    async fn play(&self) -> Result<()>;

    /// Hold the current frame.
    async fn pause(&self) -> Result<()>;

    /// Stop rendering and rewind.
    ///
    /// Engines without a dedicated stop primitive keep the default, and the
    /// orchestrator falls back to pause + seek to zero.
    async fn stop(&self) -> Result<()> {
        Err(BridgeError::NotAvailable("stop".to_string()))
    }

    /// Start an asynchronous seek to `position`.
    async fn seek_to(&self, position: Duration) -> Result<()>;

    /// Set the playback rate. Only called with strictly positive values.
    async fn set_speed(&self, speed: f64) -> Result<()>;

    /// Set the output volume, normalised to `0.0..=1.0`.
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Ask the engine to loop natively. Engines without native looping keep
    /// the default; the orchestrator loops on `Ended` either way.
    async fn set_looping(&self, _looping: bool) -> Result<()> {
        Ok(())
    }

    /// Keep the display awake while rendering.
    async fn set_keep_screen_on(&self, _keep_screen_on: bool) -> Result<()> {
        Ok(())
    }
}
