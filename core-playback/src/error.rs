//! # Playback Error Types
//!
//! Errors surfaced by the playback orchestrator.
//!
//! Adapter failures raised while executing a command are not returned to the
//! caller; they move the session to `Failed` and are published as a
//! `MediaFailed` event. The variants below are what callers can observe
//! directly.

use bridge_traits::BridgeError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    // ========================================================================
    // Session Errors
    // ========================================================================
    /// A command needed a loaded source and none was set.
    #[error("No media source loaded")]
    NotReady,

    /// The orchestrator was disposed.
    #[error("Playback orchestrator disposed")]
    Disposed,

    // ========================================================================
    // Seek Errors
    // ========================================================================
    /// The engine did not confirm a seek before the deadline (strict policy only).
    #[error("Seek not confirmed within {0:?}")]
    SeekTimeout(Duration),

    /// The caller cancelled its wait for a seek.
    #[error("Seek wait cancelled")]
    Cancelled,

    // ========================================================================
    // Adapter Errors
    // ========================================================================
    /// The native engine rejected a request.
    #[error("Engine adapter error: {0}")]
    Adapter(#[from] BridgeError),

    /// Runtime infrastructure failed (configuration, event bus).
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl PlaybackError {
    /// Returns `true` if the caller cancelled the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PlaybackError::Cancelled)
    }

    /// Returns `true` if a seek deadline expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PlaybackError::SeekTimeout(_))
    }
}

impl From<core_runtime::Error> for PlaybackError {
    fn from(err: core_runtime::Error) -> Self {
        PlaybackError::Runtime(err.to_string())
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
