//! # Playback Engines
//!
//! [`PlaybackEngine`] is the surface both engine variants share. Each variant
//! owns one host backend for its whole lifetime and turns that backend's raw
//! callbacks into canonical [`PlaybackState`](crate::state::PlaybackState)
//! events.
//!
//! ## Threading
//!
//! Engines are driven from a single thread. Backends post their callbacks into
//! the engine's bounded queue from their own worker threads; nothing is
//! reconciled until the owner calls [`PlaybackEngine::dispatch_pending`] or
//! awaits [`PlaybackEngine::next_callback`].
//!
//! ## Legality
//!
//! Control calls that are illegal in the current lifecycle return `Ok(())`
//! without touching the backend or emitting anything. After
//! [`destroy`](PlaybackEngine::destroy), every control call returns
//! [`PlaybackError::EngineDestroyed`](crate::PlaybackError::EngineDestroyed).

mod shared;
pub mod native;
pub mod streaming;

pub use native::NativeDecoderEngine;
pub use streaming::StreamingEngine;

use crate::bus::{SinkToken, StateObserver};
use crate::config::EngineConfig;
use crate::error::{PlaybackError, Result};
use crate::state::{Lifecycle, VideoSize};
use async_trait::async_trait;
use bridge_traits::playback::{DataSource, NativeDecoderBackend, StreamingBackend};
use bridge_traits::surface::SurfaceHandle;
use core_runtime::config::{DecodeMode, EngineKind};
use std::sync::Arc;

#[async_trait]
pub trait PlaybackEngine: Send {
    fn kind(&self) -> EngineKind;

    /// Binds the single state observer, replacing any previous one.
    fn register_state_observer(&mut self, observer: Box<dyn StateObserver>) -> Result<SinkToken>;

    /// Unbinds the observer bound under `token`, if it is still the current one.
    fn unregister_state_observer(&mut self, token: SinkToken) -> bool;

    /// Loads `source` and begins asynchronous preparation.
    ///
    /// A malformed or unsupported source does not fail the call; it moves the
    /// engine to `Error` and emits an error event.
    fn set_source(&mut self, source: Arc<DataSource>) -> Result<()>;

    /// Requests playback from the beginning.
    fn start(&mut self) -> Result<()> {
        self.start_at(0)
    }

    /// Requests playback from `offset_ms`. Issued before preparation
    /// completes, the request is kept and honoured on `Prepared`.
    fn start_at(&mut self, offset_ms: u64) -> Result<()>;

    fn pause(&mut self, from_user: bool) -> Result<()>;

    fn resume(&mut self) -> Result<()>;

    fn seek_to(&mut self, position_ms: u64) -> Result<()>;

    /// Halts playback, keeping the backend allocated.
    fn stop(&mut self) -> Result<()>;

    /// Returns to `Uninitialized` and drops the backend callback binding.
    fn reset(&mut self) -> Result<()>;

    /// Releases the backend. Terminal.
    fn destroy(&mut self) -> Result<()>;

    fn current_position(&self) -> u64;

    /// Duration in milliseconds; 0 whenever it cannot be reported.
    fn duration(&self) -> u64;

    fn buffered_percentage(&self) -> u8;

    fn is_playing(&self) -> bool;

    fn lifecycle(&self) -> Lifecycle;

    fn video_size(&self) -> Option<VideoSize>;

    fn data_source(&self) -> Option<Arc<DataSource>>;

    fn set_surface(&mut self, surface: Option<SurfaceHandle>) -> Result<()>;

    fn set_decode_mode(&mut self, mode: DecodeMode) -> Result<()>;

    fn set_playback_speed(&mut self, speed: f32) -> Result<()>;

    /// Reconciles every queued backend callback; returns how many were handled.
    fn dispatch_pending(&mut self) -> Result<usize>;

    /// Waits for the next backend callback and reconciles it.
    async fn next_callback(&mut self) -> Result<()>;

    fn is_destroyed(&self) -> bool;
}

/// Host backend an engine is built around.
pub enum Backend {
    Streaming(Box<dyn StreamingBackend>),
    NativeDecoder(Box<dyn NativeDecoderBackend>),
}

impl Backend {
    pub fn kind(&self) -> EngineKind {
        match self {
            Backend::Streaming(_) => EngineKind::Streaming,
            Backend::NativeDecoder(_) => EngineKind::NativeDecoder,
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Backend").field(&self.kind()).finish()
    }
}

/// Builds the engine variant matching `backend`.
///
/// # Errors
///
/// Returns [`PlaybackError::Internal`] when the configured engine kind does
/// not match the backend supplied by the host.
pub fn create_engine(config: EngineConfig, backend: Backend) -> Result<Box<dyn PlaybackEngine>> {
    if config.engine_kind != backend.kind() {
        return Err(PlaybackError::Internal(format!(
            "configured for {:?} but host supplied a {:?} backend",
            config.engine_kind,
            backend.kind()
        )));
    }

    let engine: Box<dyn PlaybackEngine> = match backend {
        Backend::Streaming(backend) => Box::new(StreamingEngine::new(backend, config)),
        Backend::NativeDecoder(backend) => Box::new(NativeDecoderEngine::new(backend, config)),
    };
    Ok(engine)
}
