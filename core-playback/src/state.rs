//! Canonical playback states and the events that carry them.
//!
//! [`Lifecycle`] is the mutually-exclusive phase of an engine. [`PlaybackState`]
//! is what observers receive: either a lifecycle value or one of the transient
//! signals (buffering, seeking, size changes, first frame) that never move the
//! lifecycle pointer themselves.

use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary playback phase of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Initialized,
    Prepared,
    Started,
    Paused,
    Stopped,
    Completed,
    Error,
}

impl Lifecycle {
    /// States in which the backend can report a duration.
    pub fn reports_duration(&self) -> bool {
        matches!(self, Lifecycle::Prepared | Lifecycle::Started | Lifecycle::Paused)
    }

    /// States in which `seek_to` is rejected.
    pub fn rejects_seek(&self) -> bool {
        matches!(
            self,
            Lifecycle::Uninitialized | Lifecycle::Stopped | Lifecycle::Error
        )
    }

    /// States from which `pause` may move to `Paused`.
    pub fn can_pause(&self) -> bool {
        matches!(self, Lifecycle::Prepared | Lifecycle::Started)
    }

    /// States from which `resume` may move to `Started`.
    pub fn can_resume(&self) -> bool {
        matches!(self, Lifecycle::Prepared | Lifecycle::Paused)
    }

    /// States from which `start` may move to `Started` once the source is ready.
    ///
    /// `Completed` is left only by loading a source again.
    pub fn can_start(&self) -> bool {
        matches!(self, Lifecycle::Prepared | Lifecycle::Started | Lifecycle::Paused)
    }

    /// States in which `stop` does nothing.
    pub fn ignores_stop(&self) -> bool {
        matches!(
            self,
            Lifecycle::Uninitialized | Lifecycle::Stopped | Lifecycle::Completed | Lifecycle::Error
        )
    }
}

/// Everything an observer can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    Uninitialized,
    Initialized,
    Prepared,
    Started,
    Paused,
    Stopped,
    Completed,
    Error,
    BufferUpdate,
    BufferStart,
    BufferEnd,
    SeekStart,
    SeekCompleted,
    VideoSizeChanged,
    SurfaceSizeChanged,
    FirstFrameRendered,
}

impl PlaybackState {
    /// Returns the lifecycle value, or `None` for transient signals.
    pub fn lifecycle(&self) -> Option<Lifecycle> {
        match self {
            PlaybackState::Uninitialized => Some(Lifecycle::Uninitialized),
            PlaybackState::Initialized => Some(Lifecycle::Initialized),
            PlaybackState::Prepared => Some(Lifecycle::Prepared),
            PlaybackState::Started => Some(Lifecycle::Started),
            PlaybackState::Paused => Some(Lifecycle::Paused),
            PlaybackState::Stopped => Some(Lifecycle::Stopped),
            PlaybackState::Completed => Some(Lifecycle::Completed),
            PlaybackState::Error => Some(Lifecycle::Error),
            _ => None,
        }
    }

    pub fn is_signal(&self) -> bool {
        self.lifecycle().is_none()
    }
}

impl From<Lifecycle> for PlaybackState {
    fn from(lifecycle: Lifecycle) -> Self {
        match lifecycle {
            Lifecycle::Uninitialized => PlaybackState::Uninitialized,
            Lifecycle::Initialized => PlaybackState::Initialized,
            Lifecycle::Prepared => PlaybackState::Prepared,
            Lifecycle::Started => PlaybackState::Started,
            Lifecycle::Paused => PlaybackState::Paused,
            Lifecycle::Stopped => PlaybackState::Stopped,
            Lifecycle::Completed => PlaybackState::Completed,
            Lifecycle::Error => PlaybackState::Error,
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Width and height of decoded video or of the render surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoSize {
    pub width: u32,
    pub height: u32,
}

impl VideoSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A state plus its auxiliary payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStateEvent {
    pub state: PlaybackState,
    /// Set on `BufferUpdate`.
    pub buffered_percentage: u8,
    /// Set on `BufferUpdate`, `VideoSizeChanged` and `SurfaceSizeChanged`.
    pub video_size: Option<VideoSize>,
    /// Set on `Error`.
    pub error_code: Option<ErrorCode>,
}

impl PlaybackStateEvent {
    pub fn new(state: PlaybackState) -> Self {
        Self {
            state,
            buffered_percentage: 0,
            video_size: None,
            error_code: None,
        }
    }

    pub fn with_buffered_percentage(mut self, percentage: u8) -> Self {
        self.buffered_percentage = percentage.min(100);
        self
    }

    pub fn with_video_size(mut self, size: Option<VideoSize>) -> Self {
        self.video_size = size;
        self
    }

    pub fn with_error_code(mut self, code: ErrorCode) -> Self {
        self.error_code = Some(code);
        self
    }
}

impl From<Lifecycle> for PlaybackStateEvent {
    fn from(lifecycle: Lifecycle) -> Self {
        Self::new(lifecycle.into())
    }
}
