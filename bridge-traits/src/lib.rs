//! # Host Bridge Traits
//!
//! Contracts between the orchestrator core and the platform code that owns the
//! real media decoder/renderer.
//!
//! ## Overview
//!
//! Each platform ships one [`NativeEngineAdapter`](playback::NativeEngineAdapter)
//! implementation (ExoPlayer on Android, AVPlayer on Apple platforms,
//! MediaPlayer on Windows, a media element on the web). The core never talks
//! to a decoder directly; it issues commands through the adapter and receives
//! the adapter's asynchronous callbacks as [`EngineEvent`](playback::EngineEvent)s
//! on a single inbound channel.
//!
//! ```text
//!  command ──> PlaybackOrchestrator ──> NativeEngineAdapter ──> native engine
//!                     ^                                               │
//!                     └────── EngineEventSink (mpsc) <── callbacks ───┘
//! ```
//!
//! ## Traits
//!
//! - [`NativeEngineAdapter`](playback::NativeEngineAdapter) - play/pause/stop/seek,
//!   source, speed and volume pushes
//! - [`LoggerSink`](logging::LoggerSink) - forward structured logs to host logging
//!
//! ## Error Handling
//!
//! Adapters report synchronous command failures as [`BridgeError`]. Failures
//! the engine discovers later (decode errors, network loss) are reported as
//! [`EngineEvent::Failed`](playback::EngineEvent::Failed) through the sink.
//!
//! ## Thread Safety
//!
//! Native callbacks arrive on threads the engine chooses, so adapters must be
//! `Send + Sync` and [`EngineEventSink`](playback::EngineEventSink) is cheap to
//! clone and safe to call from any thread.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::playback::{EngineEventSink, NativeEngineAdapter, NativeState};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyEngine {
//!     sink: parking_lot::Mutex<Option<EngineEventSink>>,
//! }
//!
//! #[async_trait]
//! impl NativeEngineAdapter for MyEngine {
//!     async fn attach(&self, sink: EngineEventSink) -> Result<()> {
//!         *self.sink.lock() = Some(sink);
//!         Ok(())
//!     }
//!     // ...
//! }
//! ```

pub mod error;
pub mod logging;
pub mod playback;

pub use error::BridgeError;

pub use logging::{LogEntry, LogLevel, LoggerSink};
pub use playback::{
    EngineEvent, EngineEventReceiver, EngineEventSink, EngineFailure, MediaSource,
    NativeEngineAdapter, NativeState, PlaybackState,
};
