//! # List Playback Scheduler
//!
//! Owns one [`PlaybackEngine`] and one [`PlayerView`] and decides which list
//! position they serve while the host list scrolls.
//!
//! ## Modes
//!
//! - [`PlayMode::Auto`]: scrolling away from the playing item detaches it at
//!   once; when the list settles, the first fully visible item is attached
//!   after the debounce window. A newer settle replaces a pending one.
//! - [`PlayMode::Click`]: only [`ListPlaybackScheduler::on_item_click`]
//!   attaches. Scrolling detaches when the playing item leaves the visible
//!   window.
//!
//! ## Driving
//!
//! Every call happens on the thread that owns the scheduler. Debounced
//! reattachments and backend callbacks are picked up by
//! [`process_pending`](ListPlaybackScheduler::process_pending) or by awaiting
//! [`tick`](ListPlaybackScheduler::tick).

use crate::config::{ListConfig, PlayMode};
use crate::error::{ListError, Result};
use crate::history::HistoryCache;
use crate::view::{PlayerView, ViewBinding};
use bridge_traits::lifecycle::HostLifecycle;
use bridge_traits::list::{ItemChangedListener, ListAdapter, ListViewport, ScrollState};
use core_async::delay::{DelayedTask, Fired};
use core_async::select;
use core_async::sync::{mpsc, CancellationToken};
use core_playback::{PlaybackEngine, PlaybackError};
use core_runtime::config::DecodeMode;
use tracing::{debug, info, instrument, warn};

const REATTACH_QUEUE_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Unattached,
    Auto { awaiting_first_layout: bool },
    Click,
}

impl Mode {
    fn play_mode(&self) -> Option<PlayMode> {
        match self {
            Mode::Unattached => None,
            Mode::Auto { .. } => Some(PlayMode::Auto),
            Mode::Click => Some(PlayMode::Click),
        }
    }
}

/// Debounced request to attach the item at `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reattach {
    child_index: usize,
    position: usize,
}

enum Wake {
    Teardown,
    Reattach(Option<Fired<Reattach>>),
    Callback(core_playback::Result<()>),
}

pub struct ListPlaybackScheduler {
    engine: Box<dyn PlaybackEngine>,
    view: PlayerView,
    config: ListConfig,
    history: HistoryCache,
    mode: Mode,
    adapter: Option<Box<dyn ListAdapter>>,
    item_listener: Option<Box<dyn ItemChangedListener>>,
    teardown_signal: Option<CancellationToken>,
    playing_position: usize,
    scroll_changed: bool,
    reattach: DelayedTask,
    reattach_tx: mpsc::Sender<Fired<Reattach>>,
    reattach_rx: mpsc::Receiver<Fired<Reattach>>,
    torn_down: bool,
}

impl ListPlaybackScheduler {
    pub fn new(engine: Box<dyn PlaybackEngine>, config: ListConfig) -> Self {
        let (reattach_tx, reattach_rx) = mpsc::channel(REATTACH_QUEUE_CAPACITY);
        Self {
            engine,
            view: PlayerView::new(),
            config,
            history: HistoryCache::new(),
            mode: Mode::Unattached,
            adapter: None,
            item_listener: None,
            teardown_signal: None,
            playing_position: 0,
            scroll_changed: false,
            reattach: DelayedTask::new(),
            reattach_tx,
            reattach_rx,
            torn_down: false,
        }
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Starts serving `adapter` in `mode`.
    ///
    /// When `host` is given, the scheduler tears itself down once the host's
    /// teardown signal fires. Attaching again replaces the previous list and
    /// mode.
    pub fn attach_to_list(
        &mut self,
        mode: PlayMode,
        adapter: Box<dyn ListAdapter>,
        host: Option<&dyn HostLifecycle>,
    ) -> Result<()> {
        self.ensure_alive()?;

        self.uninstall_mode();
        self.detach_view()?;
        self.adapter = Some(adapter);
        self.teardown_signal = host.map(|host| host.teardown_signal());
        self.install_mode(mode);

        info!(
            ?mode,
            lifecycle_bound = self.teardown_signal.is_some(),
            "list scheduler attached"
        );
        Ok(())
    }

    /// Attaches with the mode from [`ListConfig::play_mode`].
    pub fn attach_with_default_mode(
        &mut self,
        adapter: Box<dyn ListAdapter>,
        host: Option<&dyn HostLifecycle>,
    ) -> Result<()> {
        let mode = self.config.play_mode;
        self.attach_to_list(mode, adapter, host)
    }

    /// Switches between auto-play and click-play.
    ///
    /// The previous mode is fully unwound first: its pending reattachment is
    /// cancelled and the playing item is detached. A switch to auto-play
    /// attaches on the next [`on_layout_complete`](Self::on_layout_complete).
    pub fn set_auto_play_mode(&mut self, auto_play: bool) -> Result<()> {
        self.ensure_alive()?;
        let current = self.mode.play_mode().ok_or(ListError::NotAttached)?;
        let next = PlayMode::from_auto_play(auto_play);
        if current == next {
            return Ok(());
        }

        self.uninstall_mode();
        self.detach_view()?;
        self.install_mode(next);
        info!(from = ?current, to = ?next, "play mode switched");
        Ok(())
    }

    pub fn set_item_changed_listener(&mut self, listener: Option<Box<dyn ItemChangedListener>>) {
        self.item_listener = listener;
    }

    pub fn set_support_history(&mut self, enabled: bool) {
        self.config.support_history = enabled;
    }

    /// Forwards the decode mode to the owned engine.
    pub fn set_decode_mode(&mut self, mode: DecodeMode) -> Result<()> {
        self.ensure_alive()?;
        self.engine.set_decode_mode(mode)?;
        Ok(())
    }

    fn install_mode(&mut self, mode: PlayMode) {
        self.mode = match mode {
            PlayMode::Auto => Mode::Auto {
                awaiting_first_layout: true,
            },
            PlayMode::Click => Mode::Click,
        };
    }

    fn uninstall_mode(&mut self) {
        if self.reattach.cancel() {
            debug!("pending reattachment cancelled");
        }
        self.scroll_changed = false;
        self.mode = Mode::Unattached;
    }

    // ========================================================================
    // List Events
    // ========================================================================

    /// Host finished a layout pass. In auto-play mode the first pass attaches
    /// the current position at child index 0.
    pub fn on_layout_complete(&mut self) -> Result<()> {
        self.ensure_alive()?;
        if self.mode
            != (Mode::Auto {
                awaiting_first_layout: true,
            })
        {
            return Ok(());
        }

        self.detach_view()?;
        let position = self.playing_position;
        if self.attach_at(0, position)? {
            self.mode = Mode::Auto {
                awaiting_first_layout: false,
            };
        }
        Ok(())
    }

    /// Scroll delta notification.
    pub fn on_scroll(&mut self, viewport: &ListViewport) -> Result<()> {
        self.ensure_alive()?;
        match self.mode {
            Mode::Auto { .. } => {
                let Some(first) = viewport.first_fully_visible() else {
                    return Ok(());
                };
                if first != self.playing_position {
                    self.scroll_changed = true;
                    self.detach_view()?;
                }
            }
            Mode::Click => {
                let scrolled_out = self
                    .view
                    .binding()
                    .is_some_and(|binding| !viewport.contains(binding.position()));
                if scrolled_out {
                    debug!(
                        first_visible = viewport.first_visible,
                        last_visible = viewport.last_visible(),
                        "playing item scrolled out"
                    );
                    self.detach_view()?;
                }
            }
            Mode::Unattached => {}
        }
        Ok(())
    }

    /// Scroll phase change. Settling in auto-play mode schedules the debounced
    /// reattachment.
    pub fn on_scroll_state_changed(
        &mut self,
        state: ScrollState,
        viewport: &ListViewport,
    ) -> Result<()> {
        self.ensure_alive()?;
        if !matches!(self.mode, Mode::Auto { .. }) || state != ScrollState::Idle {
            return Ok(());
        }
        let Some(first) = viewport.first_fully_visible() else {
            return Ok(());
        };

        if first != self.playing_position || self.scroll_changed {
            let child_index = if first > viewport.first_visible { 1 } else { 0 };
            let generation = self.reattach.schedule(
                self.config.attach_delay,
                self.reattach_tx.clone(),
                Reattach {
                    child_index,
                    position: first,
                },
            );
            debug!(
                position = first,
                child_index,
                generation,
                delay_ms = self.config.attach_delay.as_millis() as u64,
                "reattachment scheduled"
            );
        }
        Ok(())
    }

    /// Plays the clicked item in click-play mode.
    ///
    /// Returns `true` if the item now hosts the player. Clicks are ignored in
    /// auto-play mode.
    pub fn on_item_click(&mut self, position: usize, viewport: &ListViewport) -> Result<bool> {
        self.ensure_alive()?;
        match self.mode {
            Mode::Unattached => Err(ListError::NotAttached),
            Mode::Auto { .. } => {
                debug!(position, "item click ignored in auto-play mode");
                Ok(false)
            }
            Mode::Click => {
                self.detach_view()?;
                let child_index = position.saturating_sub(viewport.first_visible);
                self.attach_at(child_index, position)
            }
        }
    }

    // ========================================================================
    // Driving
    // ========================================================================

    /// Handles everything that is ready without waiting: queued backend
    /// callbacks, then any debounced reattachment whose delay has elapsed.
    ///
    /// Returns the number of items attached.
    pub fn process_pending(&mut self) -> Result<usize> {
        self.ensure_alive()?;
        self.engine.dispatch_pending()?;

        let mut attached = 0;
        while let Ok(fired) = self.reattach_rx.try_recv() {
            if self.apply_reattach(fired)? {
                attached += 1;
            }
        }
        Ok(attached)
    }

    /// Waits for the next piece of work and handles it.
    ///
    /// Returns `false` once the scheduler is torn down, either here because
    /// the host signalled teardown or earlier.
    pub async fn tick(&mut self) -> Result<bool> {
        if self.ensure_alive().is_err() {
            return Ok(false);
        }

        let teardown_signal = self.teardown_signal.clone();
        let torn_down = async move {
            match teardown_signal {
                Some(token) => token.cancelled_owned().await,
                None => std::future::pending::<()>().await,
            }
        };

        let wake = select! {
            biased;
            _ = torn_down => Wake::Teardown,
            fired = self.reattach_rx.recv() => Wake::Reattach(fired),
            result = self.engine.next_callback() => Wake::Callback(result),
        };

        match wake {
            Wake::Teardown => {
                debug!("host teardown signalled");
                self.teardown();
                return Ok(false);
            }
            Wake::Reattach(Some(fired)) => {
                self.apply_reattach(fired)?;
            }
            Wake::Reattach(None) => {}
            Wake::Callback(result) => result?,
        }
        Ok(true)
    }

    /// Cancels pending work, detaches the player view and releases the
    /// engine. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        self.uninstall_mode();
        self.teardown_signal = None;
        if let Err(error) = self.detach_view() {
            warn!(%error, "detach during teardown failed");
        }
        self.adapter = None;

        if let Err(error) = self.engine.stop().and_then(|_| self.engine.destroy()) {
            match error {
                PlaybackError::EngineDestroyed => debug!("engine was already destroyed"),
                error => warn!(%error, "engine release during teardown failed"),
            }
        }
        info!("list scheduler torn down");
    }

    fn apply_reattach(&mut self, fired: Fired<Reattach>) -> Result<bool> {
        match self.reattach.accept(fired) {
            Some(request) => self.attach_at(request.child_index, request.position),
            None => Ok(false),
        }
    }

    fn ensure_alive(&mut self) -> Result<()> {
        if !self.torn_down
            && self
                .teardown_signal
                .as_ref()
                .is_some_and(CancellationToken::is_cancelled)
        {
            debug!("host torn down; releasing list player");
            self.teardown();
        }
        if self.torn_down {
            Err(ListError::TornDown)
        } else {
            Ok(())
        }
    }

    // ========================================================================
    // Attach / Detach
    // ========================================================================

    /// Moves the player view into the item at `position` and starts playback,
    /// resuming from history when enabled.
    ///
    /// A missing container or data source abandons the attempt and leaves
    /// the scheduler untouched.
    #[instrument(level = "debug", skip(self))]
    fn attach_at(&mut self, child_index: usize, position: usize) -> Result<bool> {
        let adapter = self.adapter.as_mut().ok_or(ListError::NotAttached)?;
        let container = adapter.container_for(child_index, position);
        let source = adapter.data_source_for(position);
        let (Some(container), Some(source)) = (container, source) else {
            warn!("attach container or data source unavailable");
            return Ok(false);
        };

        // A late debounce may still find the view bound elsewhere.
        self.detach_view()?;
        self.view.attach(container, position, child_index);
        if let Some(listener) = self.item_listener.as_mut() {
            listener.on_attach_item_view(child_index);
        }

        debug!(title = source.title(), "starting item playback");
        self.engine.set_source(source)?;
        match self.resume_offset(position) {
            Some(offset_ms) => {
                info!(offset_ms, "resuming from history");
                self.engine.start_at(offset_ms)?;
            }
            None => self.engine.start()?,
        }

        self.playing_position = position;
        self.scroll_changed = false;
        Ok(true)
    }

    /// Stops playback and takes the view out of its container, recording the
    /// offset first when history is enabled.
    fn detach_view(&mut self) -> Result<()> {
        let Some(position) = self.view.binding().map(ViewBinding::position) else {
            return Ok(());
        };

        if self.config.support_history {
            let offset_ms = self.engine.current_position();
            self.history.record(position, offset_ms);
            debug!(position, offset_ms, "playback offset recorded");
        }

        let stopped = self.engine.stop();
        if let Some(binding) = self.view.detach() {
            if let Some(listener) = self.item_listener.as_mut() {
                listener.on_detach_item_view(binding.child_index());
            }
        }
        stopped?;
        Ok(())
    }

    fn resume_offset(&self, position: usize) -> Option<u64> {
        if self.config.support_history {
            self.history.get(position)
        } else {
            None
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn engine(&self) -> &dyn PlaybackEngine {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> &mut dyn PlaybackEngine {
        self.engine.as_mut()
    }

    pub fn view(&self) -> &PlayerView {
        &self.view
    }

    pub fn history(&self) -> &HistoryCache {
        &self.history
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    /// Current mode, or `None` before `attach_to_list` and after teardown.
    pub fn play_mode(&self) -> Option<PlayMode> {
        self.mode.play_mode()
    }

    /// Position of the item hosting the player view, if any.
    pub fn bound_position(&self) -> Option<usize> {
        self.view.binding().map(ViewBinding::position)
    }

    /// Position of the most recently attached item.
    pub fn playing_position(&self) -> usize {
        self.playing_position
    }

    pub fn has_pending_reattach(&self) -> bool {
        self.reattach.is_pending()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
