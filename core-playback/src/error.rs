//! # Playback Error Types
//!
//! Two separate concerns live here:
//! - [`PlaybackError`]: returned to the *caller* of an engine operation
//!   (destroyed engine, bad configuration, backend refusal).
//! - [`ErrorCode`]: attached to an `Error` state *event* so the consuming view
//!   can show a stable subtype. Playback failures never surface as `Err`;
//!   they move the lifecycle to `Error`.

use bridge_traits::playback::{
    StreamingErrorKind, MEDIA_ERROR_IO, MEDIA_ERROR_MALFORMED, MEDIA_ERROR_UNSUPPORTED,
};
use bridge_traits::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors returned by engine operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The data source carries neither a URL nor a raw resource id.
    #[error("Invalid data source: {0}")]
    InvalidSource(String),

    /// The active backend cannot open this kind of source.
    #[error("Unsupported data source: {0}")]
    UnsupportedSource(String),

    /// The host backend refused an operation.
    #[error("Backend error: {0}")]
    Backend(#[from] BridgeError),

    /// The engine was destroyed; it must not be used again.
    #[error("Engine already destroyed")]
    EngineDestroyed,

    /// The callback queue has no sender left.
    #[error("Backend callback queue closed")]
    CallbackQueueClosed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if the error is caused by the data source itself.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::InvalidSource(_) | PlaybackError::UnsupportedSource(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Subtype attached to an `Error` state event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Reported by the streaming engine.
    Streaming(StreamingErrorKind),
    /// Framework/extra pair reported verbatim by the native decoder.
    Native { framework: i32, extra: i32 },
}

impl ErrorCode {
    /// Stable numeric code.
    ///
    /// Streaming kinds map to `Source = 0`, `Renderer = 1`, `Unexpected = 2`;
    /// native errors report their framework code.
    pub fn code(&self) -> i32 {
        match self {
            ErrorCode::Streaming(StreamingErrorKind::Source) => 0,
            ErrorCode::Streaming(StreamingErrorKind::Renderer) => 1,
            ErrorCode::Streaming(StreamingErrorKind::Unexpected) => 2,
            ErrorCode::Native { framework, .. } => *framework,
        }
    }

    /// Returns `true` when the source could not be resolved, opened or parsed.
    pub fn is_source_error(&self) -> bool {
        match self {
            ErrorCode::Streaming(kind) => *kind == StreamingErrorKind::Source,
            ErrorCode::Native { extra, .. } => matches!(
                *extra,
                MEDIA_ERROR_IO | MEDIA_ERROR_MALFORMED | MEDIA_ERROR_UNSUPPORTED
            ),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Streaming(kind) => write!(f, "streaming:{:?}({})", kind, self.code()),
            ErrorCode::Native { framework, extra } => write!(f, "native:{}/{}", framework, extra),
        }
    }
}
