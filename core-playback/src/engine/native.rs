//! Engine over the general-purpose native decoder.
//!
//! The native decoder reports one callback per event, so reconciliation is
//! mostly a matter of guarding duplicates: buffering start/end against the
//! buffering flag, size changes against the last reported size, and the
//! deferred start against the preparing phase.

use super::shared::{EngineCore, Phase};
use super::PlaybackEngine;
use crate::bus::{SinkToken, StateObserver};
use crate::config::EngineConfig;
use crate::error::{ErrorCode, PlaybackError, Result};
use crate::source;
use crate::state::{Lifecycle, PlaybackState, PlaybackStateEvent, VideoSize};
use async_trait::async_trait;
use bridge_traits::playback::{
    DataSource, DecoderOptions, NativeCallback, NativeDecoderBackend, NativeInfo,
    MEDIA_ERROR_UNKNOWN, MEDIA_ERROR_UNSUPPORTED,
};
use bridge_traits::surface::SurfaceHandle;
use core_runtime::config::{DecodeMode, EngineKind};
use core_runtime::logging::redact_url;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

pub struct NativeDecoderEngine {
    backend: Box<dyn NativeDecoderBackend>,
    core: EngineCore<NativeCallback>,
    /// A data source was handed to the decoder since the last reset.
    opened: bool,
    buffered_percentage: u8,
}

impl NativeDecoderEngine {
    pub fn new(backend: Box<dyn NativeDecoderBackend>, config: EngineConfig) -> Self {
        Self {
            backend,
            core: EngineCore::new(config),
            opened: false,
            buffered_percentage: 0,
        }
    }

    fn decoder_options(&self) -> DecoderOptions {
        DecoderOptions {
            software_decode: self.core.config.decode_mode.is_software(),
            ..DecoderOptions::default()
        }
    }

    fn is_rtmp(&self) -> bool {
        self.core
            .source
            .as_ref()
            .is_some_and(|source| source.is_rtmp())
    }

    fn reconcile(&mut self, callback: NativeCallback) {
        if self.core.config.trace_backend_callbacks {
            trace!(?callback, "native decoder callback");
        }

        match callback {
            NativeCallback::Prepared => self.on_prepared(),
            NativeCallback::VideoSizeChanged { width, height } => {
                if let Some(size) = self.core.update_video_size(width, height) {
                    self.core.emit(
                        PlaybackStateEvent::new(PlaybackState::VideoSizeChanged)
                            .with_video_size(Some(size)),
                    );
                }
            }
            NativeCallback::Completion => self.on_completion(),
            NativeCallback::SeekComplete => {
                if self.core.finish_seek() {
                    self.core.signal(PlaybackState::SeekCompleted);
                }
            }
            NativeCallback::Info(info) => self.on_info(info),
            NativeCallback::BufferingUpdate { percent } => {
                // The decoder reports a constant 0 for live RTMP.
                if self.is_rtmp() {
                    return;
                }
                self.buffered_percentage = percent.min(100);
                self.core.emit(
                    PlaybackStateEvent::new(PlaybackState::BufferUpdate)
                        .with_buffered_percentage(self.buffered_percentage)
                        .with_video_size(self.core.video_size),
                );
            }
            NativeCallback::Error { framework, extra } => {
                self.core.fail(ErrorCode::Native { framework, extra });
            }
        }
    }

    fn on_prepared(&mut self) {
        let Phase::Preparing {
            play_requested,
            pending_offset,
            seeking,
        } = self.core.phase
        else {
            debug!(phase = ?self.core.phase, "prepared outside of preparation; ignored");
            return;
        };

        self.core.phase = Phase::Ready {
            buffering: false,
            seeking,
        };
        self.core.transition(Lifecycle::Prepared);

        if play_requested {
            self.backend.start();
            self.core.transition(Lifecycle::Started);
        }
        if let Some(offset) = pending_offset {
            debug!(offset, "issuing deferred seek");
            self.seek_when_ready(offset);
        }
    }

    /// Seeks through the same path as `seek_to`; `SeekComplete` closes it.
    fn seek_when_ready(&mut self, position_ms: u64) {
        if self.core.begin_ready_seek() {
            self.backend.seek_to(position_ms);
        }
    }

    /// Completion counts only for a prepared source that was not stopped.
    fn on_completion(&mut self) {
        let playable = matches!(
            self.core.lifecycle,
            Lifecycle::Prepared | Lifecycle::Started | Lifecycle::Paused
        );
        match &mut self.core.phase {
            Phase::Ready { buffering, .. } if playable => *buffering = false,
            _ => {
                debug!(lifecycle = ?self.core.lifecycle, "late completion ignored");
                return;
            }
        }
        self.core.transition(Lifecycle::Completed);
    }

    fn on_info(&mut self, info: NativeInfo) {
        match info {
            NativeInfo::VideoRenderingStart => {
                self.core.signal(PlaybackState::FirstFrameRendered);
            }
            NativeInfo::BufferingStart => {
                if let Phase::Ready { buffering, .. } = &mut self.core.phase {
                    if !*buffering {
                        *buffering = true;
                        self.core.signal(PlaybackState::BufferStart);
                    }
                }
            }
            NativeInfo::BufferingEnd => {
                if let Phase::Ready { buffering, .. } = &mut self.core.phase {
                    if *buffering {
                        *buffering = false;
                        self.core.signal(PlaybackState::BufferEnd);
                    }
                }
            }
            other => debug!(info = ?other, "native decoder info"),
        }
    }
}

#[async_trait]
impl PlaybackEngine for NativeDecoderEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::NativeDecoder
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

        if self.opened {
            self.backend.stop();
            self.backend.reset();
            self.opened = false;
        }
        let sender = self.core.rebind();
        self.backend.bind_callbacks(Some(sender));
        self.core.phase = Phase::Inert;
        self.core.video_size = None;
        self.buffered_percentage = 0;
        self.core.source = Some(Arc::clone(&data_source));

        let options = self.decoder_options();
        self.backend.configure(&options);
        self.backend.set_speed(self.core.config.playback_speed);
        self.core.transition(Lifecycle::Initialized);

        let locator = match source::resolve_native(&data_source, &self.core.config.resource_package) {
            Ok(locator) => locator,
            Err(err) => {
                warn!(error = %err, "rejecting data source");
                self.core.fail(ErrorCode::Native {
                    framework: MEDIA_ERROR_UNKNOWN,
                    extra: MEDIA_ERROR_UNSUPPORTED,
                });
                return Ok(());
            }
        };

        info!(
            url = %redact_url(data_source.media_url()),
            software = options.software_decode,
            "opening native source"
        );
        self.opened = true;
        let opened = self
            .backend
            .set_data_source(locator)
            .and_then(|_| self.backend.prepare_async());
        if let Err(err) = opened {
            warn!(error = %err, "native decoder failed to open source");
            self.core.fail(ErrorCode::Native {
                framework: MEDIA_ERROR_UNKNOWN,
                extra: 0,
            });
            return Ok(());
        }

        self.core.phase = Phase::preparing();
        Ok(())
    }

    fn start_at(&mut self, offset_ms: u64) -> Result<()> {
        self.core.ensure_alive()?;

        if self.core.defer_start(offset_ms) {
            debug!(offset_ms, "start requested while preparing");
            return Ok(());
        }

        if !matches!(self.core.phase, Phase::Ready { .. }) || !self.core.lifecycle.can_start() {
            debug!(lifecycle = ?self.core.lifecycle, "start ignored");
            return Ok(());
        }

        self.backend.start();
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
            return Ok(());
        }
        if !self.core.lifecycle.can_pause() {
            return Ok(());
        }

        debug!(from_user, "pausing");
        self.backend.pause();
        self.core.transition(Lifecycle::Paused);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.core.ensure_alive()?;
        if !self.core.lifecycle.can_resume() || !matches!(self.core.phase, Phase::Ready { .. }) {
            return Ok(());
        }

        self.backend.start();
        self.core.transition(Lifecycle::Started);
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<()> {
        self.core.ensure_alive()?;
        if self.core.lifecycle.rejects_seek() {
            debug!(lifecycle = ?self.core.lifecycle, "seek rejected");
            return Ok(());
        }

        match &mut self.core.phase {
            // The decoder cannot seek before it is prepared; replay it on `Prepared`.
            Phase::Preparing {
                pending_offset,
                seeking,
                ..
            } => {
                *pending_offset = Some(position_ms);
                *seeking = true;
            }
            Phase::Ready { seeking, .. } => {
                *seeking = true;
                self.backend.seek_to(position_ms);
            }
            Phase::Inert => return Ok(()),
        }

        self.core.signal(PlaybackState::SeekStart);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.core.ensure_alive()?;
        if self.core.lifecycle.ignores_stop() {
            return Ok(());
        }

        self.backend.stop();
        self.core.phase = Phase::Inert;
        self.core.transition(Lifecycle::Stopped);
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.core.ensure_alive()?;

        self.backend.reset();
        self.backend.bind_callbacks(None);
        self.core.clear_binding();
        self.opened = false;
        self.buffered_percentage = 0;
        self.core.phase = Phase::Inert;
        self.core.video_size = None;
        self.core.source = None;
        self.core.transition(Lifecycle::Uninitialized);
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        self.core.ensure_alive()?;

        info!("releasing native decoder");
        self.backend.set_surface(None);
        self.backend.bind_callbacks(None);
        self.backend.release();
        self.core.clear_binding();
        self.core.source = None;
        self.opened = false;
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
        if self.core.is_destroyed() || !self.core.lifecycle.reports_duration() {
            return 0;
        }
        self.backend.duration().max(0) as u64
    }

    fn buffered_percentage(&self) -> u8 {
        self.buffered_percentage
    }

    fn is_playing(&self) -> bool {
        !self.core.is_destroyed() && self.backend.is_playing()
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
        // Applied on the next open.
        self.core.config.decode_mode = mode;
        Ok(())
    }

    fn set_playback_speed(&mut self, speed: f32) -> Result<()> {
        self.core.ensure_alive()?;
        if !speed.is_finite() || speed <= 0.0 {
            warn!(speed, "ignoring invalid playback speed");
            return Ok(());
        }
        self.core.config.playback_speed = speed;
        self.backend.set_speed(speed);
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
