//! # Playback Orchestration Module
//!
//! Uniform playback contract over heterogeneous native media engines.
//!
//! ## Overview
//!
//! This module handles:
//! - The public playback state machine and its native-state mapping
//! - At-most-one-in-flight seeks with a deadline safety net
//! - Lossless, idempotent mute through a volume shadow
//! - A lock-free position source for the subtitle engine
//!
//! The engine itself sits behind [`bridge_traits::NativeEngineAdapter`]; this
//! crate never decodes or renders anything.

pub mod error;
pub mod metadata;
pub mod orchestrator;
pub mod position;
pub mod seek;
pub mod session;
pub mod state;
pub mod volume;

pub use error::{PlaybackError, Result};
pub use metadata::{MediaMetadata, NowPlaying};
pub use orchestrator::PlaybackOrchestrator;
pub use position::{PositionSnapshot, PositionSource};
pub use seek::{SeekCoordinator, SeekOutcome};
pub use session::PlaybackSession;
pub use state::{next_state, TransitionFlags};
pub use volume::VolumeShadow;
