//! Workspace facade crate.
//!
//! Re-exports the playback orchestrator and subtitle engine crates behind
//! feature flags so host applications can depend on a single crate. The
//! default `service` feature exposes the combined [`core_service::MediaService`].

#[cfg(feature = "service")]
pub use core_service::{CoreError, MediaService};

#[cfg(any(feature = "service", feature = "playback-only"))]
pub use core_playback as playback;

#[cfg(any(feature = "service", feature = "subtitles-only"))]
pub use core_subtitles as subtitles;
