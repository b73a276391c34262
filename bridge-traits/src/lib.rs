//! # Host Bridge Traits
//!
//! Contracts the host application implements for the player core.
//!
//! ## Traits
//!
//! ### Decoding
//! - [`StreamingBackend`](playback::StreamingBackend) - adaptive-streaming decoder
//! - [`NativeDecoderBackend`](playback::NativeDecoderBackend) - general-purpose native decoder
//!
//! ### List integration
//! - [`ListAdapter`](list::ListAdapter) - containers and data sources per adapter position
//! - [`ItemContainer`](list::ItemContainer) - a list item able to host the player view
//! - [`ItemChangedListener`](list::ItemChangedListener) - attach/detach notifications
//! - [`HostLifecycle`](lifecycle::HostLifecycle) - teardown signal of the owning screen
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - forward structured logs to host logging
//!
//! ## Threading
//!
//! Every trait here is `Send`. Backends may call [`CallbackSender::post`]
//! from any thread; everything else is invoked from the thread that owns the
//! engine and scheduler.

pub mod error;
pub mod lifecycle;
pub mod list;
pub mod logging;
pub mod playback;
pub mod surface;

pub use error::BridgeError;

pub use lifecycle::HostLifecycle;
pub use list::{ItemChangedListener, ItemContainer, ListAdapter, ListViewport, ScrollState, ViewId};
pub use playback::{
    CallbackSender, DataSource, DecoderOptions, MediaSource, NativeCallback, NativeDecoderBackend,
    NativeInfo, NativeMediaLocator, StreamingBackend, StreamingCallback, StreamingErrorKind,
    StreamingPhase,
};
pub use surface::SurfaceHandle;
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
