//! Media service façade.
//!
//! [`MediaService`] is what host applications hold: one playback
//! orchestrator and one subtitle engine attached to the same native engine
//! adapter and publishing on one event bus. Subtitle polling follows the
//! playback state on its own; hosts only load tracks and render
//! `ActiveCueChanged` events.
//!
//! ```ignore
//! use core_service::MediaService;
//! use core_runtime::config::OrchestratorConfig;
//! use core_subtitles::SubtitleFormat;
//!
//! let config = OrchestratorConfig::builder().adapter(engine).build()?;
//! let service = MediaService::new(config).await?;
//!
//! service.update_source(Some(MediaSource::file("/media/clip.mp4"))).await;
//! service.load_subtitle_track(&raw_srt, SubtitleFormat::Srt)?;
//! service.play().await;
//! ```

pub mod error;
mod service;

pub use error::{CoreError, Result};
pub use service::MediaService;
