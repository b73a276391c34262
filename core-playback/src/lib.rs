//! # Playback Engine Module
//!
//! Normalizes two structurally different decoding backends into one
//! canonical playback lifecycle.
//!
//! ## Overview
//!
//! This module handles:
//! - The canonical [`Lifecycle`] and transient signal states ([`PlaybackState`])
//! - The single-observer [`StateEventBus`]
//! - [`StreamingEngine`] over an adaptive-streaming backend and
//!   [`NativeDecoderEngine`] over a general-purpose native decoder
//! - Marshaling backend callbacks from decoder threads onto the owning thread
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{create_engine, Backend, EngineConfig, EventRecorder, PlaybackEngine};
//!
//! let mut engine = create_engine(EngineConfig::default(), Backend::Streaming(backend))?;
//! let recorder = EventRecorder::new();
//! engine.register_state_observer(Box::new(recorder.clone()))?;
//!
//! engine.set_source(source)?;
//! engine.start_at(15_000)?;
//!
//! // On the owning thread, whenever the backend may have posted callbacks:
//! engine.dispatch_pending()?;
//! ```

pub mod bus;
pub mod callbacks;
pub mod config;
pub mod engine;
pub mod error;
pub mod source;
pub mod state;

pub use bus::{EventRecorder, SinkToken, StateEventBus, StateObserver};
pub use callbacks::CallbackQueue;
pub use config::EngineConfig;
pub use engine::{create_engine, Backend, NativeDecoderEngine, PlaybackEngine, StreamingEngine};
pub use error::{ErrorCode, PlaybackError, Result};
pub use state::{Lifecycle, PlaybackState, PlaybackStateEvent, VideoSize};

pub use bridge_traits::playback::DataSource;
