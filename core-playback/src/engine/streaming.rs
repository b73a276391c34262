//! Engine over the adaptive-streaming backend.
//!
//! The backend reports `(play_when_ready, phase)` pairs rather than one
//! callback per event, so the same raw shape means different things depending
//! on where the engine is: a `Ready` pair is `Prepared` the first time,
//! closes a pending seek, ends buffering, or is a plain play/pause change.

use super::shared::{EngineCore, Phase};
use super::PlaybackEngine;
use crate::bus::{SinkToken, StateObserver};
use crate::config::EngineConfig;
use crate::error::{ErrorCode, PlaybackError, Result};
use crate::source;
use crate::state::{Lifecycle, PlaybackState, PlaybackStateEvent, VideoSize};
use async_trait::async_trait;
use bridge_traits::playback::{
    DataSource, StreamingBackend, StreamingCallback, StreamingErrorKind, StreamingPhase,
};
use bridge_traits::surface::SurfaceHandle;
use core_runtime::config::{DecodeMode, EngineKind};
use core_runtime::logging::redact_url;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

pub struct StreamingEngine {
    backend: Box<dyn StreamingBackend>,
    core: EngineCore<StreamingCallback>,
}

impl StreamingEngine {
    pub fn new(backend: Box<dyn StreamingBackend>, config: EngineConfig) -> Self {
        let mut backend = backend;
        if config.decode_mode.is_software() {
            debug!("streaming engine decodes in hardware; software decode ignored");
        }
        backend.set_playback_speed(config.playback_speed);
        Self {
            backend,
            core: EngineCore::new(config),
        }
    }

    fn reconcile(&mut self, callback: StreamingCallback) {
        if self.core.config.trace_backend_callbacks {
            trace!(?callback, "streaming callback");
        }

        match callback {
            StreamingCallback::LoadingChanged { is_loading } => {
                if !is_loading {
                    let event = PlaybackStateEvent::new(PlaybackState::BufferUpdate)
                        .with_buffered_percentage(self.backend.buffered_percentage())
                        .with_video_size(self.core.video_size);
                    self.core.emit(event);
                }
            }
            StreamingCallback::StateChanged {
                play_when_ready,
                phase,
            } => self.on_state_changed(play_when_ready, phase),
            StreamingCallback::VideoSizeChanged { width, height } => {
                let size = VideoSize::new(width, height);
                self.core.video_size = Some(size);
                self.core.emit(
                    PlaybackStateEvent::new(PlaybackState::VideoSizeChanged)
                        .with_video_size(Some(size)),
                );
            }
            StreamingCallback::SurfaceSizeChanged { width, height } => {
                self.core.emit(
                    PlaybackStateEvent::new(PlaybackState::SurfaceSizeChanged)
                        .with_video_size(Some(VideoSize::new(width, height))),
                );
            }
            StreamingCallback::RenderedFirstFrame => {
                self.core.signal(PlaybackState::FirstFrameRendered);
            }
            StreamingCallback::Error { kind, message } => {
                warn!(?kind, %message, "streaming backend error");
                self.core.fail(ErrorCode::Streaming(kind));
            }
        }
    }

    fn on_state_changed(&mut self, play_when_ready: bool, phase: StreamingPhase) {
        match self.core.phase {
            Phase::Inert => {
                debug!(?phase, "state change with no source loaded; ignored");
            }
            Phase::Preparing {
                play_requested,
                pending_offset,
                seeking,
            } => match phase {
                StreamingPhase::Ready => {
                    self.core.phase = Phase::Ready {
                        buffering: false,
                        seeking: false,
                    };
                    self.core.transition(Lifecycle::Prepared);
                    if seeking {
                        self.core.signal(PlaybackState::SeekCompleted);
                    }
                    if play_requested {
                        self.core.transition(Lifecycle::Started);
                    }
                    if let Some(offset) = pending_offset {
                        debug!(offset, "issuing deferred start seek");
                        self.seek_when_ready(offset);
                    }
                }
                StreamingPhase::Ended => {
                    self.core.phase = Phase::Ready {
                        buffering: false,
                        seeking: false,
                    };
                    self.core.transition(Lifecycle::Prepared);
                    self.core.transition(Lifecycle::Completed);
                }
                StreamingPhase::Idle | StreamingPhase::Buffering => {}
            },
            Phase::Ready { buffering, .. } => match phase {
                StreamingPhase::Ready => {
                    if self.core.finish_seek() {
                        self.core.signal(PlaybackState::SeekCompleted);
                    }
                    if buffering {
                        self.set_buffering(false);
                    }
                    self.follow_play_when_ready(play_when_ready);
                }
                StreamingPhase::Buffering => {
                    if !buffering {
                        self.set_buffering(true);
                    }
                }
                StreamingPhase::Ended => {
                    if buffering {
                        self.set_buffering(false);
                    }
                    self.core.transition(Lifecycle::Completed);
                }
                StreamingPhase::Idle => {}
            },
        }
    }

    fn set_buffering(&mut self, value: bool) {
        if let Phase::Ready { buffering, .. } = &mut self.core.phase {
            *buffering = value;
            self.core.signal(if value {
                PlaybackState::BufferStart
            } else {
                PlaybackState::BufferEnd
            });
        }
    }

    /// Seeks through the same path as `seek_to`; the next `Ready` closes it.
    fn seek_when_ready(&mut self, position_ms: u64) {
        if self.core.begin_ready_seek() {
            self.backend.seek_to(position_ms);
        }
    }

    /// Emits `Started`/`Paused` only when the lifecycle actually changes.
    fn follow_play_when_ready(&mut self, play_when_ready: bool) {
        let next = match (self.core.lifecycle, play_when_ready) {
            (Lifecycle::Prepared | Lifecycle::Paused, true) => Lifecycle::Started,
            (Lifecycle::Started, false) => Lifecycle::Paused,
            _ => return,
        };
        self.core.transition(next);
    }
}

#[async_trait]
impl PlaybackEngine for StreamingEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Streaming
    }

    fn register_state_observer(&mut self, observer: Box<dyn StateObserver>) -> Result<SinkToken> {
        self.core.ensure_alive()?;
        Ok(self.core.observe(observer))
    }

    fn unregister_state_observer(&mut self, token: SinkToken) -> bool {
        self.core.unobserve(token)
    }

    fn set_source(&mut self, data_source: Arc<DataSource>) -> Result<()> {
        self.core.ensure_alive()?;

        self.core.phase = Phase::Inert;
        self.core.video_size = None;
        self.backend.stop(true);
        let sender = self.core.rebind();
        self.backend.bind_callbacks(Some(sender));
        self.core.source = Some(Arc::clone(&data_source));
        self.core.transition(Lifecycle::Initialized);

        let media = match source::resolve_streaming(&data_source) {
            Ok(media) => media,
            Err(err) => {
                warn!(error = %err, "rejecting data source");
                self.core.fail(ErrorCode::Streaming(StreamingErrorKind::Source));
                return Ok(());
            }
        };

        info!(
            kind = media.kind(),
            url = %redact_url(data_source.media_url()),
            "preparing streaming source"
        );
        if let Err(err) = self.backend.prepare(media) {
            warn!(error = %err, "backend refused to prepare");
            self.core.fail(ErrorCode::Streaming(StreamingErrorKind::Source));
            return Ok(());
        }

        self.core.phase = Phase::preparing();
        Ok(())
    }

    fn start_at(&mut self, offset_ms: u64) -> Result<()> {
        self.core.ensure_alive()?;

        if self.core.defer_start(offset_ms) {
            debug!(offset_ms, "start requested while preparing");
            self.backend.set_play_when_ready(true);
            return Ok(());
        }

        if !matches!(self.core.phase, Phase::Ready { .. }) || !self.core.lifecycle.can_start() {
            debug!(lifecycle = ?self.core.lifecycle, "start ignored");
            return Ok(());
        }

        self.backend.set_play_when_ready(true);
        self.core.transition(Lifecycle::Started);
        if offset_ms > 0 {
            self.seek_when_ready(offset_ms);
        }
        Ok(())
    }

    fn pause(&mut self, from_user: bool) -> Result<()> {
        self.core.ensure_alive()?;

        if self.core.withdraw_start() {
            debug!(from_user, "pending start withdrawn");
            self.backend.set_play_when_ready(false);
            return Ok(());
        }
        if !self.core.lifecycle.can_pause() {
            return Ok(());
        }

        debug!(from_user, "pausing");
        self.backend.set_play_when_ready(false);
        self.core.transition(Lifecycle::Paused);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.core.ensure_alive()?;
        if !self.core.lifecycle.can_resume() || !matches!(self.core.phase, Phase::Ready { .. }) {
            return Ok(());
        }

        self.backend.set_play_when_ready(true);
        self.core.transition(Lifecycle::Started);
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        self.core.ensure_alive()?;
        if self.core.lifecycle.rejects_seek() || !self.core.begin_seek() {
            debug!(lifecycle = ?self.core.lifecycle, "seek rejected");
            return Ok(());
        }

        self.backend.seek_to(position_ms);
        self.core.signal(PlaybackState::SeekStart);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.core.ensure_alive()?;
        if self.core.lifecycle.ignores_stop() {
            return Ok(());
        }

        self.backend.stop(false);
        self.core.phase = Phase::Inert;
        self.core.transition(Lifecycle::Stopped);
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.core.ensure_alive()?;

        self.backend.stop(true);
        self.backend.bind_callbacks(None);
        self.core.clear_binding();
        self.core.phase = Phase::Inert;
        self.core.video_size = None;
        self.core.source = None;
        self.core.transition(Lifecycle::Uninitialized);
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        self.core.ensure_alive()?;

        info!("releasing streaming backend");
        self.backend.set_surface(None);
        self.backend.bind_callbacks(None);
        self.backend.release();
        self.core.clear_binding();
        self.core.source = None;
        self.core.mark_destroyed();
        Ok(())
    }

    fn current_position(&self) -> u64 {
        if self.core.is_destroyed() {
            return 0;
        }
        self.backend.current_position()
    }

    fn duration(&self) -> u64 {
        if self.core.is_destroyed() {
            return 0;
        }
        self.backend.duration().max(0) as u64
    }

    fn buffered_percentage(&self) -> u8 {
        if self.core.is_destroyed() {
            return 0;
        }
        self.backend.buffered_percentage().min(100)
    }

    fn is_playing(&self) -> bool {
        !self.core.is_destroyed()
            && self.core.lifecycle == Lifecycle::Started
            && self.backend.play_when_ready()
            && !self.core.buffering()
    }

    fn lifecycle(&self) -> Lifecycle {
        self.core.lifecycle
    }

    fn video_size(&self) -> Option<VideoSize> {
        self.core.video_size
    }

    fn data_source(&self) -> Option<Arc<DataSource>> {
        self.core.source.clone()
    }

    fn set_surface(&mut self, surface: Option<SurfaceHandle>) -> Result<()> {
        self.core.ensure_alive()?;
        self.backend.set_surface(surface);
        Ok(())
    }

    fn set_decode_mode(&mut self, mode: DecodeMode) -> Result<()> {
        self.core.ensure_alive()?;
        if mode.is_software() {
            warn!("software decode is not supported by the streaming engine; ignored");
        }
        Ok(())
    }

    fn set_playback_speed(&mut self, speed: f32) -> Result<()> {
        self.core.ensure_alive()?;
        if !speed.is_finite() || speed <= 0.0 {
            warn!(speed, "ignoring invalid playback speed");
            return Ok(());
        }
        self.core.config.playback_speed = speed;
        self.backend.set_playback_speed(speed);
        Ok(())
    }

    fn dispatch_pending(&mut self) -> Result<usize> {
        self.core.ensure_alive()?;
        let mut handled = 0;
        while let Some(callback) = self.core.callbacks.try_next() {
            self.reconcile(callback);
            handled += 1;
        }
        Ok(handled)
    }

    async fn next_callback(&mut self) -> Result<()> {
        self.core.ensure_alive()?;
        match self.core.callbacks.next().await {
            Some(callback) => {
                self.reconcile(callback);
                Ok(())
            }
            None => Err(PlaybackError::CallbackQueueClosed),
        }
    }

    fn is_destroyed(&self) -> bool {
        self.core.is_destroyed()
    }
}
