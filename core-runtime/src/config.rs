//! # Orchestrator Configuration
//!
//! ## Overview
//!
//! [`OrchestratorConfig`] holds the native engine adapter plus the tunables
//! of the playback and subtitle subsystems. It is built with
//! [`OrchestratorConfigBuilder`], which validates everything up front so a
//! misconfigured orchestrator never starts.
//!
//! ## Required Dependencies
//!
//! - `NativeEngineAdapter` - the platform engine being orchestrated
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{OrchestratorConfig, SeekTimeoutPolicy};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = OrchestratorConfig::builder()
//!     .adapter(Arc::new(MyEngine::new()))
//!     .seek_timeout(Duration::from_secs(30))
//!     .seek_timeout_policy(SeekTimeoutPolicy::Strict)
//!     .auto_play(true)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::OrchestratorConfig;
//!
//! // No adapter injected
//! let config = OrchestratorConfig::builder()
//!     .build()
//!     .expect("Should fail - missing engine adapter");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::NativeEngineAdapter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default deadline for a seek to report completion.
pub const DEFAULT_SEEK_TIMEOUT: Duration = Duration::from_secs(120);

/// Default subtitle polling cadence.
pub const DEFAULT_SUBTITLE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What a seek does when the engine never reports completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeekTimeoutPolicy {
    /// Treat the deadline as success. Some engines never fire a completion
    /// callback for seeks that land on the current position.
    #[default]
    Lenient,
    /// Report the deadline as an error to the caller.
    Strict,
}

/// Initial values for the orchestrator's user-facing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackDefaults {
    #[serde(default)]
    pub auto_play: bool,
    #[serde(default)]
    pub should_loop: bool,
    #[serde(default)]
    pub keep_screen_on: bool,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_speed")]
    pub speed: f64,
}

fn default_volume() -> f32 {
    1.0
}

fn default_speed() -> f64 {
    1.0
}

impl Default for PlaybackDefaults {
    fn default() -> Self {
        Self {
            auto_play: false,
            should_loop: false,
            keep_screen_on: false,
            volume: default_volume(),
            speed: default_speed(),
        }
    }
}

impl PlaybackDefaults {
    /// Validate ranges.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.volume.is_finite() || !(0.0..=1.0).contains(&self.volume) {
            return Err(format!(
                "Initial volume must be within 0.0..=1.0, got {}",
                self.volume
            ));
        }
        if !self.speed.is_finite() {
            return Err("Initial speed must be finite".to_string());
        }
        Ok(())
    }
}

/// Validated orchestrator configuration.
#[derive(Clone)]
pub struct OrchestratorConfig {
    /// The platform engine.
    pub adapter: Arc<dyn NativeEngineAdapter>,

    /// How long a seek waits for the engine's completion callback.
    pub seek_timeout: Duration,

    pub seek_timeout_policy: SeekTimeoutPolicy,

    /// Cadence of the subtitle synchronization loop.
    pub subtitle_poll_interval: Duration,

    /// Per-subscriber event buffer.
    pub event_buffer_size: usize,

    pub defaults: PlaybackDefaults,
}

impl std::fmt::Debug for OrchestratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorConfig")
            .field("adapter", &"NativeEngineAdapter { ... }")
            .field("seek_timeout", &self.seek_timeout)
            .field("seek_timeout_policy", &self.seek_timeout_policy)
            .field("subtitle_poll_interval", &self.subtitle_poll_interval)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl OrchestratorConfig {
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// This checks:
    /// - Seek timeout and subtitle poll interval are non-zero
    /// - Event buffer can hold at least one event
    /// - Initial volume and speed are in range
    pub fn validate(&self) -> Result<()> {
        if self.seek_timeout.is_zero() {
            return Err(Error::Config(
                "Seek timeout must be greater than zero".to_string(),
            ));
        }

        if self.subtitle_poll_interval.is_zero() {
            return Err(Error::Config(
                "Subtitle poll interval must be greater than zero".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be at least 1".to_string(),
            ));
        }

        self.defaults.validate().map_err(Error::Config)
    }
}

fn adapter_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "NativeEngineAdapter".to_string(),
        message: "A NativeEngineAdapter is required to drive playback. \
                  Android: wrap ExoPlayer/Media3. Apple: wrap AVPlayer. \
                  Windows: wrap MediaPlayer. Tests: inject a scripted engine."
            .to_string(),
    }
}

/// Builder for [`OrchestratorConfig`].
#[derive(Default)]
pub struct OrchestratorConfigBuilder {
    adapter: Option<Arc<dyn NativeEngineAdapter>>,
    seek_timeout: Option<Duration>,
    seek_timeout_policy: SeekTimeoutPolicy,
    subtitle_poll_interval: Option<Duration>,
    event_buffer_size: Option<usize>,
    defaults: PlaybackDefaults,
}

impl OrchestratorConfigBuilder {
    /// Sets the native engine adapter (required).
    pub fn adapter(mut self, adapter: Arc<dyn NativeEngineAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Default: 120 seconds.
    pub fn seek_timeout(mut self, timeout: Duration) -> Self {
        self.seek_timeout = Some(timeout);
        self
    }

    /// Default: [`SeekTimeoutPolicy::Lenient`].
    pub fn seek_timeout_policy(mut self, policy: SeekTimeoutPolicy) -> Self {
        self.seek_timeout_policy = policy;
        self
    }

    /// Default: 1 second.
    pub fn subtitle_poll_interval(mut self, interval: Duration) -> Self {
        self.subtitle_poll_interval = Some(interval);
        self
    }

    /// Default: [`DEFAULT_EVENT_BUFFER_SIZE`].
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Replaces all initial playback settings at once.
    pub fn defaults(mut self, defaults: PlaybackDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn auto_play(mut self, enabled: bool) -> Self {
        self.defaults.auto_play = enabled;
        self
    }

    pub fn should_loop(mut self, enabled: bool) -> Self {
        self.defaults.should_loop = enabled;
        self
    }

    pub fn keep_screen_on(mut self, enabled: bool) -> Self {
        self.defaults.keep_screen_on = enabled;
        self
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.defaults.volume = volume;
        self
    }

    pub fn speed(mut self, speed: f64) -> Self {
        self.defaults.speed = speed;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] if no adapter was injected
    /// - [`Error::Config`] if any value is out of range
    pub fn build(self) -> Result<OrchestratorConfig> {
        let adapter = self.adapter.ok_or_else(adapter_missing_error)?;

        let config = OrchestratorConfig {
            adapter,
            seek_timeout: self.seek_timeout.unwrap_or(DEFAULT_SEEK_TIMEOUT),
            seek_timeout_policy: self.seek_timeout_policy,
            subtitle_poll_interval: self
                .subtitle_poll_interval
                .unwrap_or(DEFAULT_SUBTITLE_POLL_INTERVAL),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            defaults: self.defaults,
        };

        config.validate()?;
        Ok(config)
    }
}
