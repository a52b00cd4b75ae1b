//! Now-playing data for lock-screen and media-session surfaces.

use bridge_traits::PlaybackState;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Descriptive metadata for the current item, supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub artwork_url: Option<String>,
}

impl MediaMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_artwork_url(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.artwork_url.is_none()
    }
}

/// Everything a system media surface needs, captured atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub metadata: MediaMetadata,
    pub state: PlaybackState,
    pub position: Duration,
    pub duration: Duration,
    pub speed: f64,
}

impl NowPlaying {
    /// Rate a media session should advertise: zero unless actually playing.
    pub fn playback_rate(&self) -> f64 {
        if self.state == PlaybackState::Playing && self.speed > 0.0 {
            self.speed
        } else {
            0.0
        }
    }
}
