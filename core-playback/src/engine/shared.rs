//! State shared by both engine variants.

use crate::bus::{SinkToken, StateEventBus, StateObserver};
use crate::callbacks::CallbackQueue;
use crate::config::EngineConfig;
use crate::error::{ErrorCode, PlaybackError, Result};
use crate::state::{Lifecycle, PlaybackState, PlaybackStateEvent, VideoSize};
use bridge_traits::playback::{CallbackSender, DataSource};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reconciliation sub-state.
///
/// Buffering can only be flagged once the backend is ready, and a deferred
/// start offset can only exist while preparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Phase {
    /// No source is loading or loaded.
    #[default]
    Inert,
    /// A source was handed to the backend; readiness not yet reported.
    Preparing {
        play_requested: bool,
        pending_offset: Option<u64>,
        seeking: bool,
    },
    /// The backend reported readiness at least once for the current source.
    Ready { buffering: bool, seeking: bool },
}

impl Phase {
    pub(crate) fn preparing() -> Self {
        Phase::Preparing {
            play_requested: false,
            pending_offset: None,
            seeking: false,
        }
    }
}

pub(crate) struct EngineCore<C> {
    pub(crate) config: EngineConfig,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) phase: Phase,
    pub(crate) video_size: Option<VideoSize>,
    pub(crate) source: Option<Arc<DataSource>>,
    pub(crate) callbacks: CallbackQueue<C>,
    bus: StateEventBus,
    destroyed: bool,
}

impl<C> EngineCore<C> {
    pub(crate) fn new(config: EngineConfig) -> Self {
        let callbacks = CallbackQueue::new(config.callback_queue_capacity);
        Self {
            config,
            lifecycle: Lifecycle::Uninitialized,
            phase: Phase::Inert,
            video_size: None,
            source: None,
            callbacks,
            bus: StateEventBus::new(),
            destroyed: false,
        }
    }

    pub(crate) fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            Err(PlaybackError::EngineDestroyed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.destroyed = true;
        self.phase = Phase::Inert;
        self.lifecycle = Lifecycle::Uninitialized;
        self.bus.unbind();
    }

    /// Starts a new callback session for the next source.
    ///
    /// Anything the backend queued for the previous source is discarded and
    /// its old sender is disconnected.
    pub(crate) fn rebind(&mut self) -> CallbackSender<C> {
        self.clear_binding();
        self.callbacks.sender()
    }

    /// Drops the backend binding and anything it still had queued.
    pub(crate) fn clear_binding(&mut self) {
        let dropped = self.callbacks.renew();
        if dropped > 0 {
            debug!(dropped, "discarded stale backend callbacks");
        }
    }

    pub(crate) fn observe(&mut self, observer: Box<dyn StateObserver>) -> SinkToken {
        self.bus.bind(observer)
    }

    pub(crate) fn unobserve(&mut self, token: SinkToken) -> bool {
        self.bus.unbind_if(token)
    }

    pub(crate) fn emit(&mut self, event: PlaybackStateEvent) {
        self.bus.emit(event);
    }

    pub(crate) fn signal(&mut self, state: PlaybackState) {
        self.emit(PlaybackStateEvent::new(state));
    }

    /// Moves the lifecycle and emits it; emits nothing when unchanged.
    pub(crate) fn transition(&mut self, next: Lifecycle) -> bool {
        if self.lifecycle == next {
            return false;
        }
        debug!(from = ?self.lifecycle, to = ?next, "lifecycle transition");
        self.lifecycle = next;
        self.emit(next.into());
        true
    }

    /// Unconditional move to `Error`; pre-empts any reconciliation in flight.
    pub(crate) fn fail(&mut self, code: ErrorCode) {
        warn!(code = %code, from = ?self.lifecycle, "playback error");
        self.phase = Phase::Inert;
        self.lifecycle = Lifecycle::Error;
        self.emit(PlaybackStateEvent::from(Lifecycle::Error).with_error_code(code));
    }

    /// Records a new video size; returns it only when it differs from the last one.
    pub(crate) fn update_video_size(&mut self, width: u32, height: u32) -> Option<VideoSize> {
        let size = VideoSize::new(width, height);
        if self.video_size == Some(size) {
            return None;
        }
        self.video_size = Some(size);
        Some(size)
    }

    pub(crate) fn buffering(&self) -> bool {
        matches!(self.phase, Phase::Ready { buffering: true, .. })
    }

    /// Sets the seeking flag for an accepted seek; `false` when no source is loaded.
    pub(crate) fn begin_seek(&mut self) -> bool {
        match &mut self.phase {
            Phase::Preparing { seeking, .. } | Phase::Ready { seeking, .. } => {
                *seeking = true;
                true
            }
            Phase::Inert => false,
        }
    }

    /// Opens a seek the engine issues on its own once ready.
    ///
    /// Emits `SeekStart` unless a seek is already open, so the one that closes
    /// it is still reported exactly once.
    pub(crate) fn begin_ready_seek(&mut self) -> bool {
        let opened = match &mut self.phase {
            Phase::Ready { seeking, .. } => !std::mem::replace(seeking, true),
            _ => return false,
        };
        if opened {
            self.signal(PlaybackState::SeekStart);
        }
        true
    }

    /// Clears the seeking flag once ready; returns whether a seek was pending.
    pub(crate) fn finish_seek(&mut self) -> bool {
        match &mut self.phase {
            Phase::Ready { seeking, .. } if *seeking => {
                *seeking = false;
                true
            }
            _ => false,
        }
    }

    /// Captures a start request issued before readiness.
    ///
    /// A zero offset keeps whatever seek is already pending.
    pub(crate) fn defer_start(&mut self, offset_ms: u64) -> bool {
        match &mut self.phase {
            Phase::Preparing {
                play_requested,
                pending_offset,
                ..
            } => {
                *play_requested = true;
                if offset_ms > 0 {
                    *pending_offset = Some(offset_ms);
                }
                true
            }
            _ => false,
        }
    }

    /// Withdraws a start request captured while preparing.
    pub(crate) fn withdraw_start(&mut self) -> bool {
        match &mut self.phase {
            Phase::Preparing {
                play_requested,
                pending_offset,
                ..
            } if *play_requested => {
                *play_requested = false;
                *pending_offset = None;
                true
            }
            _ => false,
        }
    }
}
