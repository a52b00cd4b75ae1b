//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the media orchestrator:
//! - Logging and tracing infrastructure
//! - Configuration with fail-fast validation
//! - Event bus for state, position, volume and subtitle notifications
//!
//! ## Overview
//!
//! Every other orchestrator crate depends on this one. It fixes the logging
//! conventions, the shape of the configuration, and the event vocabulary
//! observers subscribe to.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{OrchestratorConfig, PlaybackDefaults, SeekTimeoutPolicy};
pub use error::{Error, Result};
pub use events::{CoreEvent, CueSnapshot, EventBus, EventStream, PlaybackEvent, SubtitleEvent};
