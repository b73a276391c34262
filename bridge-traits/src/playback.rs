//! Decoder backend bridge traits and supporting media types.
//!
//! A host ships one or both concrete decoders: an adaptive-streaming player
//! that reports `(play_when_ready, phase)` pairs, and a general-purpose native
//! decoder that reports one callback per event. The core wraps each in a
//! `PlaybackEngine` that reconciles the raw callbacks into canonical states.
//!
//! Backends run their own worker threads. They must never call back into the
//! engine directly; every callback is posted through the [`CallbackSender`]
//! handed to them by `bind_callbacks` and is drained later on the thread that
//! owns the engine.

use crate::error::{BridgeError, Result};
use crate::surface::SurfaceHandle;
use core_async::sync::mpsc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Data Source
// ============================================================================

/// Scheme prefix for RTMP live streams.
pub const RTMP_SCHEME: &str = "rtmp:";

/// Media to play plus a display title.
///
/// Immutable once built. Sources are shared as `Arc<DataSource>` and two of
/// them are the same item only when they are the same allocation, so the type
/// has no content equality; use [`DataSource::same_item`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    media_url: String,
    raw_id: Option<u32>,
    title: String,
}

impl DataSource {
    /// A network or file URL.
    pub fn url(media_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            media_url: media_url.into(),
            raw_id: None,
            title: title.into(),
        }
    }

    /// A resource bundled with the host application, addressed by id.
    pub fn raw(raw_id: u32, title: impl Into<String>) -> Self {
        Self {
            media_url: String::new(),
            raw_id: Some(raw_id),
            title: title.into(),
        }
    }

    /// A file inside the host application's asset bundle.
    pub fn asset(path: impl AsRef<str>, title: impl Into<String>) -> Self {
        Self {
            media_url: format!("asset:///{}", path.as_ref().trim_start_matches('/')),
            raw_id: None,
            title: title.into(),
        }
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    /// Raw resource id, when the source is a bundled resource. Zero is not a valid id.
    pub fn raw_id(&self) -> Option<u32> {
        self.raw_id.filter(|id| *id > 0)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns `true` for RTMP live streams.
    pub fn is_rtmp(&self) -> bool {
        self.media_url.starts_with(RTMP_SCHEME)
    }

    /// Identity comparison. Two sources built from the same URL are still
    /// different items.
    pub fn same_item(a: &Arc<DataSource>, b: &Arc<DataSource>) -> bool {
        Arc::ptr_eq(a, b)
    }

    /// Returns `true` for asset-bundle paths.
    pub fn is_asset(&self) -> bool {
        self.media_url.starts_with("asset:///") || self.media_url.contains("android_asset")
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw_id() {
            Some(id) => write!(f, "{} (raw:{})", self.title, id),
            None => write!(f, "{} ({})", self.title, self.media_url),
        }
    }
}

// ============================================================================
// Callback Marshaling
// ============================================================================

/// Sending half of an engine's bounded callback queue.
///
/// Cloneable so a backend can hand it to each of its worker threads.
#[derive(Debug)]
pub struct CallbackSender<C> {
    inner: mpsc::Sender<C>,
}

impl<C> Clone for CallbackSender<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C> CallbackSender<C> {
    pub fn new(inner: mpsc::Sender<C>) -> Self {
        Self { inner }
    }

    /// Posts a callback without blocking.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::QueueFull`] if the engine has not drained the queue
    /// - [`BridgeError::Disconnected`] if the engine reset or dropped this binding
    pub fn post(&self, callback: C) -> Result<()> {
        self.inner.try_send(callback).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => BridgeError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => BridgeError::Disconnected,
        })
    }

    /// Returns `true` once the engine stopped listening on this binding.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

// ============================================================================
// Streaming Backend
// ============================================================================

/// Concrete media source the streaming backend builds a pipeline for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Progressive download over the default transport.
    Progressive { uri: String },
    /// Progressive download over an RTMP transport.
    Rtmp { uri: String },
    Dash { uri: String },
    Hls { uri: String },
    SmoothStreaming { uri: String },
    /// Bundled resource opened through the raw-resource data source.
    RawResource { raw_id: u32 },
}

impl MediaSource {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MediaSource::Progressive { .. } => "progressive",
            MediaSource::Rtmp { .. } => "rtmp",
            MediaSource::Dash { .. } => "dash",
            MediaSource::Hls { .. } => "hls",
            MediaSource::SmoothStreaming { .. } => "smooth-streaming",
            MediaSource::RawResource { .. } => "raw-resource",
        }
    }
}

/// Playback phase reported by the streaming backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamingPhase {
    Idle,
    Buffering,
    Ready,
    Ended,
}

/// Error class reported by the streaming backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamingErrorKind {
    /// The source could not be resolved, opened or parsed.
    Source,
    /// Codec or rendering pipeline failure.
    Renderer,
    /// Anything else raised inside the backend.
    Unexpected,
}

/// Raw callbacks of the streaming backend.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamingCallback {
    LoadingChanged { is_loading: bool },
    StateChanged {
        play_when_ready: bool,
        phase: StreamingPhase,
    },
    VideoSizeChanged { width: u32, height: u32 },
    SurfaceSizeChanged { width: u32, height: u32 },
    RenderedFirstFrame,
    Error {
        kind: StreamingErrorKind,
        message: String,
    },
}

/// Adaptive-streaming decoder backend.
pub trait StreamingBackend: Send {
    /// Installs (or with `None`, removes) the callback binding.
    fn bind_callbacks(&mut self, sender: Option<CallbackSender<StreamingCallback>>);

    /// Starts asynchronous preparation of `source`.
    fn prepare(&mut self, source: MediaSource) -> Result<()>;

    fn set_play_when_ready(&mut self, play_when_ready: bool);

    fn play_when_ready(&self) -> bool;

    fn seek_to(&mut self, position_ms: u64);

    /// Stops playback; with `reset` the loaded media is discarded as well.
    fn stop(&mut self, reset: bool);

    /// Releases the decoder. The backend is unusable afterwards.
    fn release(&mut self);

    fn set_surface(&mut self, surface: Option<SurfaceHandle>);

    fn current_position(&self) -> u64;

    /// Duration in milliseconds; negative when unknown.
    fn duration(&self) -> i64;

    fn buffered_percentage(&self) -> u8;

    fn set_playback_speed(&mut self, speed: f32);
}

// ============================================================================
// Native Decoder Backend
// ============================================================================

/// Framework error code the native decoder uses when nothing more specific applies.
pub const MEDIA_ERROR_UNKNOWN: i32 = 1;

/// Extra code: the source could not be read.
pub const MEDIA_ERROR_IO: i32 = -1004;

/// Extra code: the bitstream is not conforming.
pub const MEDIA_ERROR_MALFORMED: i32 = -1007;

/// Extra code: the source uses a feature the decoder does not support.
pub const MEDIA_ERROR_UNSUPPORTED: i32 = -1010;

/// Options applied to the native decoder on every open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderOptions {
    /// `true` decodes in software, `false` uses the platform hardware codec.
    pub software_decode: bool,
    /// Frames the decoder may drop when video falls behind audio.
    pub frame_drop: u32,
    /// Pitch-preserving speed change.
    pub sound_touch: bool,
    /// Clear the DNS cache when opening network sources.
    pub dns_cache_clear: bool,
    /// Skip the in-loop deblocking filter (0 = never).
    pub skip_loop_filter: u32,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            software_decode: true,
            frame_drop: 5,
            sound_touch: true,
            dns_cache_clear: true,
            skip_loop_filter: 0,
        }
    }
}

/// How the native decoder should open a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeMediaLocator {
    /// Open by URI.
    Uri(String),
    /// Open through the raw-resource provider (`android.resource://...`).
    RawResource(String),
}

/// Informational codes from the native decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeInfo {
    VideoRenderingStart,
    BufferingStart,
    BufferingEnd,
    VideoTrackLagging,
    NetworkBandwidth,
    BadInterleaving,
    NotSeekable,
    MetadataUpdate,
    AudioRenderingStart,
    Other(i32),
}

/// Raw callbacks of the native decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCallback {
    Prepared,
    VideoSizeChanged { width: u32, height: u32 },
    Completion,
    SeekComplete,
    Info(NativeInfo),
    BufferingUpdate { percent: u8 },
    Error { framework: i32, extra: i32 },
}

/// General-purpose native decoder backend.
pub trait NativeDecoderBackend: Send {
    /// Installs (or with `None`, removes) the callback binding.
    fn bind_callbacks(&mut self, sender: Option<CallbackSender<NativeCallback>>);

    fn configure(&mut self, options: &DecoderOptions);

    fn set_data_source(&mut self, locator: NativeMediaLocator) -> Result<()>;

    fn prepare_async(&mut self) -> Result<()>;

    fn start(&mut self);

    fn pause(&mut self);

    fn stop(&mut self);

    /// Returns the decoder to its idle state; a new data source may be set.
    fn reset(&mut self);

    /// Releases the decoder. The backend is unusable afterwards.
    fn release(&mut self);

    fn seek_to(&mut self, position_ms: u64);

    fn is_playing(&self) -> bool;

    fn current_position(&self) -> u64;

    /// Duration in milliseconds; negative when unknown.
    fn duration(&self) -> i64;

    fn set_surface(&mut self, surface: Option<SurfaceHandle>);

    fn set_speed(&mut self, speed: f32);
}
