//! # Subtitle Module
//!
//! Cue extraction from SRT and WebVTT text, and the polling engine that keeps
//! exactly one active cue in step with playback position.
//!
//! ## Overview
//!
//! - [`SubtitleFormat::parse`] turns raw text into an ordered `Vec<SubtitleCue>`
//!   or fails with a [`FormatError`]; a failed parse yields no cues at all.
//! - [`SubtitleEngine`] owns the loaded track, polls a [`PositionProvider`]
//!   once per interval, and publishes active-cue changes.
//!
//! Styling markup is carried through untouched in the cue text. Rendering it
//! is the caller's concern.
//!
//! ## Usage
//!
//! ```rust
//! use core_subtitles::SubtitleFormat;
//! use std::time::Duration;
//!
//! let cues = SubtitleFormat::Srt
//!     .parse("1\n00:00:01,000 --> 00:00:02,000\nHi\n")
//!     .unwrap();
//!
//! assert_eq!(cues.len(), 1);
//! assert!(cues[0].contains(Duration::from_millis(1500)));
//! ```

pub mod cue;
pub mod engine;
pub mod error;
pub mod format;
mod parser;
pub mod srt;
pub mod vtt;

pub use cue::{StyleNode, SubtitleCue};
pub use engine::{ActiveCueStream, PositionProvider, SubtitleEngine};
pub use error::{FormatError, Result};
pub use format::SubtitleFormat;
