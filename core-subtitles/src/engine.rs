//! # Subtitle Synchronization Engine
//!
//! Keeps exactly one active cue (or none) in step with playback position.
//!
//! ## Overview
//!
//! The engine owns the loaded cue list. While started, a poller task reads
//! the [`PositionProvider`] once per interval, picks the first cue whose
//! inclusive `[start, end]` range contains the position, and publishes a
//! change only when that differs from the current active cue.
//!
//! Ticks evaluate under the same mutex that [`SubtitleEngine::stop`] takes to
//! cancel the poller, so no change is published after `stop` returns.
//! `stop` also hides the active cue; a later `start` begins from a clean
//! slate against the same track. [`SubtitleEngine::close`] is a final stop:
//! `start` is refused from then on.
//!
//! ## Usage
//!
//! ```ignore
//! use core_subtitles::{SubtitleEngine, SubtitleFormat};
//! use futures::StreamExt;
//!
//! let engine = SubtitleEngine::default();
//! engine.load_text(raw_srt, SubtitleFormat::Srt)?;
//!
//! let mut changes = engine.active_cue_changes();
//! let position = player.position_source();
//! engine.start(move || position.position());
//!
//! while let Some(cue) = changes.next().await {
//!     renderer.show(cue.map(|c| c.text));
//! }
//! ```

use crate::cue::SubtitleCue;
use crate::error::{FormatError, Result};
use crate::format::SubtitleFormat;
use core_async::sync::broadcast::{self, error::RecvError};
use core_async::sync::CancellationToken;
use core_async::time::Ticker;
use core_runtime::config::DEFAULT_SUBTITLE_POLL_INTERVAL;
use core_runtime::events::{CoreEvent, EventBus, SubtitleEvent};
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

const CHANGE_BUFFER: usize = 16;

/// Stream of active-cue changes; `None` means hide.
pub type ActiveCueStream = BoxStream<'static, Option<SubtitleCue>>;

/// Anything that can report the current playback position.
pub trait PositionProvider: Send + Sync + 'static {
    fn position(&self) -> Duration;
}

impl<F> PositionProvider for F
where
    F: Fn() -> Duration + Send + Sync + 'static,
{
    fn position(&self) -> Duration {
        self()
    }
}

/// Polls playback position and tracks the active cue of one track.
pub struct SubtitleEngine {
    inner: Arc<Inner>,
}

struct Inner {
    track: Mutex<Track>,
    changes: broadcast::Sender<Option<SubtitleCue>>,
    events: Option<EventBus>,
    poll_interval: Duration,
}

#[derive(Default)]
struct Track {
    cues: Vec<SubtitleCue>,
    /// Index into `cues`.
    active: Option<usize>,
    poller: Option<CancellationToken>,
    closed: bool,
}

impl SubtitleEngine {
    /// Create an engine polling every `poll_interval`. A zero interval falls
    /// back to [`DEFAULT_SUBTITLE_POLL_INTERVAL`].
    pub fn new(poll_interval: Duration) -> Self {
        Self::build(poll_interval, None)
    }

    /// Like [`SubtitleEngine::new`], also publishing [`SubtitleEvent`]s on
    /// `events`.
    pub fn with_event_bus(poll_interval: Duration, events: EventBus) -> Self {
        Self::build(poll_interval, Some(events))
    }

    fn build(poll_interval: Duration, events: Option<EventBus>) -> Self {
        let poll_interval = if poll_interval.is_zero() {
            warn!("Zero subtitle poll interval; using default");
            DEFAULT_SUBTITLE_POLL_INTERVAL
        } else {
            poll_interval
        };
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            inner: Arc::new(Inner {
                track: Mutex::new(Track::default()),
                changes,
                events,
                poll_interval,
            }),
        }
    }

    // ========================================================================
    // Track
    // ========================================================================

    /// Replace the track wholesale. Returns the number of cues loaded.
    ///
    /// A currently shown cue is hidden; the next tick evaluates the new
    /// track. An empty track is valid.
    ///
    /// # Errors
    ///
    /// [`FormatError::InvalidCue`] if a cue ends before it starts. The
    /// previous track stays loaded in that case.
    pub fn load_track(&self, cues: Vec<SubtitleCue>) -> Result<usize> {
        if let Some((index, cue)) = cues.iter().enumerate().find(|(_, c)| !c.is_well_ordered()) {
            return Err(FormatError::InvalidCue {
                index,
                start: cue.start.unwrap_or_default(),
                end: cue.end.unwrap_or_default(),
            });
        }

        let cue_count = cues.len();
        let mut track = self.inner.track.lock();
        self.inner.hide(&mut track);
        track.cues = cues;
        self.inner.emit(SubtitleEvent::TrackLoaded { cue_count });
        info!(cue_count, "Subtitle track loaded");
        Ok(cue_count)
    }

    /// Parse `raw` and load the result.
    ///
    /// # Errors
    ///
    /// Any [`FormatError`] from parsing. Nothing is loaded and the previous
    /// track is untouched.
    pub fn load_text(&self, raw: &str, format: SubtitleFormat) -> Result<usize> {
        let cues = format.parse(raw).inspect_err(|err| {
            warn!(%format, %err, "Subtitle document rejected");
        })?;
        self.load_track(cues)
    }

    /// Drop the track, hiding the active cue. Polling, if running, continues
    /// against an empty track.
    pub fn clear_track(&self) {
        let mut track = self.inner.track.lock();
        if track.cues.is_empty() && track.active.is_none() {
            return;
        }
        self.inner.hide(&mut track);
        track.cues.clear();
        self.inner.emit(SubtitleEvent::TrackCleared);
        debug!("Subtitle track cleared");
    }

    pub fn cue_count(&self) -> usize {
        self.inner.track.lock().cues.len()
    }

    /// Copy of the loaded cues in parse order.
    pub fn cues(&self) -> Vec<SubtitleCue> {
        self.inner.track.lock().cues.clone()
    }

    pub fn active_cue(&self) -> Option<SubtitleCue> {
        let track = self.inner.track.lock();
        track.active.map(|index| track.cues[index].clone())
    }

    // ========================================================================
    // Polling
    // ========================================================================

    /// Begin polling `provider`. The first tick runs immediately.
    ///
    /// Returns `false` without effect if polling is already running or the
    /// engine was closed.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start<P: PositionProvider>(&self, provider: P) -> bool {
        let token = {
            let mut track = self.inner.track.lock();
            if track.poller.is_some() || track.closed {
                return false;
            }
            let token = CancellationToken::new();
            track.poller = Some(token.clone());
            token
        };

        core_async::task::spawn(poll(
            Arc::downgrade(&self.inner),
            provider,
            token,
            self.inner.poll_interval,
        ));
        debug!(interval_ms = self.inner.poll_interval.as_millis() as u64, "Subtitle polling started");
        true
    }

    /// Stop polling and hide the active cue. No change is published after
    /// this returns. Idempotent.
    pub fn stop(&self) {
        let mut track = self.inner.track.lock();
        self.inner.halt(&mut track);
    }

    /// Stop polling for good. Idempotent.
    pub fn close(&self) {
        let mut track = self.inner.track.lock();
        track.closed = true;
        self.inner.halt(&mut track);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.track.lock().closed
    }

    pub fn is_running(&self) -> bool {
        self.inner.track.lock().poller.is_some()
    }

    pub fn poll_interval(&self) -> Duration {
        self.inner.poll_interval
    }

    /// Changes of the active cue published after this call.
    ///
    /// The stream outlives `stop`/`start` cycles and ends when the engine is
    /// dropped. A subscriber that falls behind skips to the newest changes.
    pub fn active_cue_changes(&self) -> ActiveCueStream {
        let receiver = self.inner.changes.subscribe();
        stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(cue) => return Some((cue, receiver)),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Active cue subscriber lagged");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}

impl Default for SubtitleEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SUBTITLE_POLL_INTERVAL)
    }
}

impl Drop for SubtitleEngine {
    fn drop(&mut self) {
        if let Some(token) = self.inner.track.lock().poller.take() {
            token.cancel();
        }
    }
}

impl std::fmt::Debug for SubtitleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let track = self.inner.track.lock();
        f.debug_struct("SubtitleEngine")
            .field("cues", &track.cues.len())
            .field("active", &track.active)
            .field("running", &track.poller.is_some())
            .field("poll_interval", &self.inner.poll_interval)
            .finish()
    }
}

impl Inner {
    fn emit(&self, event: SubtitleEvent) {
        if let Some(events) = &self.events {
            let _ = events.emit(CoreEvent::Subtitle(event));
        }
    }

    fn publish(&self, cue: Option<SubtitleCue>) {
        self.emit(SubtitleEvent::ActiveCueChanged {
            cue: cue.as_ref().map(SubtitleCue::snapshot),
        });
        // No subscribers is not an error.
        let _ = self.changes.send(cue);
    }

    fn halt(&self, track: &mut Track) {
        if let Some(token) = track.poller.take() {
            token.cancel();
            debug!("Subtitle polling stopped");
        }
        self.hide(track);
    }

    fn hide(&self, track: &mut Track) {
        if track.active.take().is_some() {
            self.publish(None);
        }
    }

    /// One poll. Ignored if `token` was cancelled before the lock was taken.
    fn tick(&self, position: Duration, token: &CancellationToken) {
        let mut track = self.track.lock();
        if token.is_cancelled() {
            return;
        }

        let matched = track.cues.iter().position(|cue| cue.contains(position));
        if matched == track.active {
            return;
        }
        track.active = matched;
        let cue = matched.map(|index| track.cues[index].clone());
        debug!(
            position_ms = position.as_millis() as u64,
            cue = ?matched,
            "Active subtitle cue changed"
        );
        self.publish(cue);
    }
}

async fn poll<P: PositionProvider>(
    inner: Weak<Inner>,
    provider: P,
    token: CancellationToken,
    period: Duration,
) {
    let mut ticker = Ticker::new(period, token.clone());
    while ticker.tick().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.tick(provider.position(), &token);
    }
}
