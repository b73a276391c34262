//! Integration tests for the list playback scheduler.

use async_trait::async_trait;
use bridge_traits::list::{
    ItemChangedListener, ItemContainer, ListAdapter, ListViewport, ScrollState, ViewId,
};
use bridge_traits::playback::DataSource;
use bridge_traits::surface::SurfaceHandle;
use core_async::sync::CancellationToken;
use core_async::time::{sleep, Duration};
use core_list::{ListConfig, ListError, ListPlaybackScheduler, PlayMode};
use core_playback::{
    Lifecycle, PlaybackEngine, PlaybackError, Result as PlaybackResult, SinkToken,
    StateEventBus, StateObserver, VideoSize,
};
use core_runtime::config::{DecodeMode, EngineKind};
use mockall::predicate::eq;
use mockall::{mock, Sequence};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

const ITEMS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    SetSource(String),
    Start(u64),
    Stop,
    Destroy,
    DecodeMode(DecodeMode),
    AddView(usize),
    RemoveView(usize),
    Attach(usize),
    Detach(usize),
}

type Log = Arc<Mutex<Vec<Event>>>;

// ============================================================================
// Fakes
// ============================================================================

struct FakeEngine {
    log: Log,
    position: Arc<Mutex<u64>>,
    bus: StateEventBus,
    lifecycle: Lifecycle,
    source: Option<Arc<DataSource>>,
    destroyed: bool,
}

impl FakeEngine {
    fn alive(&self) -> PlaybackResult<()> {
        if self.destroyed {
            Err(PlaybackError::EngineDestroyed)
        } else {
            Ok(())
        }
    }

    fn record(&self, event: Event) {
        self.log.lock().push(event);
    }
}

#[async_trait]
impl PlaybackEngine for FakeEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Streaming
    }

    fn register_state_observer(
        &mut self,
        observer: Box<dyn StateObserver>,
    ) -> PlaybackResult<SinkToken> {
        self.alive()?;
        Ok(self.bus.bind(observer))
    }

    fn unregister_state_observer(&mut self, token: SinkToken) -> bool {
        self.bus.unbind_if(token)
    }

    fn set_source(&mut self, source: Arc<DataSource>) -> PlaybackResult<()> {
        self.alive()?;
        self.record(Event::SetSource(source.title().to_string()));
        self.source = Some(source);
        self.lifecycle = Lifecycle::Initialized;
        Ok(())
    }

    fn start_at(&mut self, offset_ms: u64) -> PlaybackResult<()> {
        self.alive()?;
        self.record(Event::Start(offset_ms));
        self.lifecycle = Lifecycle::Started;
        Ok(())
    }

    fn pause(&mut self, _from_user: bool) -> PlaybackResult<()> {
        self.alive()
    }

    fn resume(&mut self) -> PlaybackResult<()> {
        self.alive()
    }

    fn seek_to(&mut self, _position_ms: u64) -> PlaybackResult<()> {
        self.alive()
    }

    fn stop(&mut self) -> PlaybackResult<()> {
        self.alive()?;
        self.record(Event::Stop);
        self.lifecycle = Lifecycle::Stopped;
        Ok(())
    }

    fn reset(&mut self) -> PlaybackResult<()> {
        self.alive()?;
        self.lifecycle = Lifecycle::Uninitialized;
        Ok(())
    }

    fn destroy(&mut self) -> PlaybackResult<()> {
        self.alive()?;
        self.record(Event::Destroy);
        self.destroyed = true;
        Ok(())
    }

    fn current_position(&self) -> u64 {
        *self.position.lock()
    }

    fn duration(&self) -> u64 {
        0
    }

    fn buffered_percentage(&self) -> u8 {
        0
    }

    fn is_playing(&self) -> bool {
        self.lifecycle == Lifecycle::Started
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn video_size(&self) -> Option<VideoSize> {
        None
    }

    fn data_source(&self) -> Option<Arc<DataSource>> {
        self.source.clone()
    }

    fn set_surface(&mut self, _surface: Option<SurfaceHandle>) -> PlaybackResult<()> {
        self.alive()
    }

    fn set_decode_mode(&mut self, mode: DecodeMode) -> PlaybackResult<()> {
        self.alive()?;
        self.record(Event::DecodeMode(mode));
        Ok(())
    }

    fn set_playback_speed(&mut self, _speed: f32) -> PlaybackResult<()> {
        self.alive()
    }

    fn dispatch_pending(&mut self) -> PlaybackResult<usize> {
        self.alive()?;
        Ok(0)
    }

    async fn next_callback(&mut self) -> PlaybackResult<()> {
        std::future::pending::<()>().await;
        Ok(())
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

struct FakeContainer {
    position: usize,
    log: Log,
}

impl ItemContainer for FakeContainer {
    fn add_view(&mut self, _view: ViewId) {
        self.log.lock().push(Event::AddView(self.position));
    }

    fn remove_view(&mut self, _view: ViewId) {
        self.log.lock().push(Event::RemoveView(self.position));
    }
}

struct FakeAdapter {
    log: Log,
    without_media: HashSet<usize>,
}

impl ListAdapter for FakeAdapter {
    fn container_for(
        &mut self,
        _child_index: usize,
        position: usize,
    ) -> Option<Box<dyn ItemContainer>> {
        (position < ITEMS).then(|| {
            Box::new(FakeContainer {
                position,
                log: self.log.clone(),
            }) as Box<dyn ItemContainer>
        })
    }

    fn data_source_for(&mut self, position: usize) -> Option<Arc<DataSource>> {
        if position >= ITEMS || self.without_media.contains(&position) {
            return None;
        }
        Some(clip(position))
    }
}

struct RecordingListener {
    log: Log,
}

impl ItemChangedListener for RecordingListener {
    fn on_attach_item_view(&mut self, child_index: usize) {
        self.log.lock().push(Event::Attach(child_index));
    }

    fn on_detach_item_view(&mut self, old_child_index: usize) {
        self.log.lock().push(Event::Detach(old_child_index));
    }
}

mock! {
    Adapter {}

    impl ListAdapter for Adapter {
        fn container_for(&mut self, child_index: usize, position: usize)
            -> Option<Box<dyn ItemContainer>>;
        fn data_source_for(&mut self, position: usize) -> Option<Arc<DataSource>>;
    }
}

mock! {
    Listener {}

    impl ItemChangedListener for Listener {
        fn on_attach_item_view(&mut self, child_index: usize);
        fn on_detach_item_view(&mut self, old_child_index: usize);
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn clip(position: usize) -> Arc<DataSource> {
    Arc::new(DataSource::url(
        format!("https://cdn.example.com/clips/{position}.mp4"),
        format!("clip {position}"),
    ))
}

/// One fully visible item, aligned to the top.
fn at(first: usize) -> ListViewport {
    ListViewport::new(first, 1, ITEMS)
}

/// `first` partly scrolled off the top, so `first + 1` is the first fully visible item.
fn between(first: usize) -> ListViewport {
    ListViewport::new(first, 2, ITEMS).with_first_child_top(Some(-120))
}

struct Harness {
    scheduler: ListPlaybackScheduler,
    log: Log,
    position: Arc<Mutex<u64>>,
}

impl Harness {
    fn new(config: ListConfig) -> Self {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let position = Arc::new(Mutex::new(0));
        let engine = FakeEngine {
            log: log.clone(),
            position: position.clone(),
            bus: StateEventBus::new(),
            lifecycle: Lifecycle::Uninitialized,
            source: None,
            destroyed: false,
        };
        let mut scheduler = ListPlaybackScheduler::new(Box::new(engine), config);
        scheduler.set_item_changed_listener(Some(Box::new(RecordingListener { log: log.clone() })));
        Self {
            scheduler,
            log,
            position,
        }
    }

    fn attached(mode: PlayMode, config: ListConfig) -> Self {
        Self::attached_without_media(mode, config, &[])
    }

    fn attached_without_media(mode: PlayMode, config: ListConfig, without_media: &[usize]) -> Self {
        let mut harness = Self::new(config);
        let adapter = FakeAdapter {
            log: harness.log.clone(),
            without_media: without_media.iter().copied().collect(),
        };
        harness
            .scheduler
            .attach_to_list(mode, Box::new(adapter), None)
            .unwrap();
        harness
    }

    fn events(&self) -> Vec<Event> {
        self.log.lock().clone()
    }

    fn clear(&self) {
        self.log.lock().clear();
    }

    fn count(&self, wanted: impl Fn(&Event) -> bool) -> usize {
        self.log.lock().iter().filter(|event| wanted(event)).count()
    }

    fn added_views(&self) -> Vec<usize> {
        self.log
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::AddView(position) => Some(*position),
                _ => None,
            })
            .collect()
    }

    fn starts(&self) -> Vec<u64> {
        self.log
            .lock()
            .iter()
            .filter_map(|event| match event {
                Event::Start(offset) => Some(*offset),
                _ => None,
            })
            .collect()
    }

    fn set_position(&self, offset_ms: u64) {
        *self.position.lock() = offset_ms;
    }

    /// Scrolls from the playing item to `target` and lets the list settle there.
    fn scroll_to(&mut self, target: usize) {
        self.scheduler.on_scroll(&at(target)).unwrap();
        self.scheduler
            .on_scroll_state_changed(ScrollState::Idle, &at(target))
            .unwrap();
    }

    async fn settle(&mut self) -> usize {
        sleep(Duration::from_millis(300)).await;
        self.scheduler.process_pending().unwrap()
    }
}

fn history_config() -> ListConfig {
    ListConfig::default().with_support_history(true)
}

// ============================================================================
// Auto-play
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_first_layout_attaches_current_position_once() {
    let mut h = Harness::attached(PlayMode::Auto, ListConfig::default());

    h.scheduler.on_layout_complete().unwrap();
    assert_eq!(
        h.events(),
        vec![
            Event::AddView(0),
            Event::Attach(0),
            Event::SetSource("clip 0".into()),
            Event::Start(0),
        ]
    );

    h.clear();
    h.scheduler.on_layout_complete().unwrap();
    assert!(h.events().is_empty());
    assert_eq!(h.scheduler.bound_position(), Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_scroll_through_twenty_items_attaches_only_landing_item() {
    let mut h = Harness::attached(PlayMode::Auto, ListConfig::default());
    h.scheduler.on_layout_complete().unwrap();
    h.clear();

    h.scheduler
        .on_scroll_state_changed(ScrollState::TouchScroll, &at(0))
        .unwrap();
    for position in 1..=3 {
        h.scheduler.on_scroll(&between(position - 1)).unwrap();
        h.scheduler.on_scroll(&at(position)).unwrap();
    }
    // The list reports a spurious settle mid-fling.
    h.scheduler
        .on_scroll_state_changed(ScrollState::Idle, &at(3))
        .unwrap();
    assert!(h.scheduler.has_pending_reattach());
    sleep(Duration::from_millis(50)).await;

    h.scheduler
        .on_scroll_state_changed(ScrollState::Fling, &at(3))
        .unwrap();
    for position in 4..=7 {
        h.scheduler.on_scroll(&between(position - 1)).unwrap();
        h.scheduler.on_scroll(&at(position)).unwrap();
    }
    h.scheduler
        .on_scroll_state_changed(ScrollState::Idle, &at(7))
        .unwrap();

    assert_eq!(h.settle().await, 1);
    assert_eq!(h.added_views(), vec![7]);
    assert_eq!(h.count(|e| *e == Event::RemoveView(0)), 1);
    assert_eq!(h.count(|e| matches!(e, Event::SetSource(_))), 1);
    assert_eq!(h.scheduler.playing_position(), 7);
    assert!(!h.scheduler.has_pending_reattach());

    sleep(Duration::from_secs(1)).await;
    assert_eq!(h.scheduler.process_pending().unwrap(), 0);
    assert_eq!(h.added_views(), vec![7]);
}

#[tokio::test(start_paused = true)]
async fn test_scroll_detaches_immediately_and_attach_waits_for_debounce() {
    let mut h = Harness::attached(PlayMode::Auto, ListConfig::default());
    h.scheduler.on_layout_complete().unwrap();
    h.clear();

    h.scheduler.on_scroll(&between(0)).unwrap();
    assert_eq!(
        h.events(),
        vec![Event::Stop, Event::RemoveView(0), Event::Detach(0)]
    );
    assert_eq!(h.scheduler.bound_position(), None);

    h.scheduler
        .on_scroll_state_changed(ScrollState::Idle, &between(0))
        .unwrap();
    sleep(Duration::from_millis(150)).await;
    assert_eq!(h.scheduler.process_pending().unwrap(), 0);
    assert!(h.added_views().is_empty());

    assert_eq!(h.settle().await, 1);
    assert_eq!(h.added_views(), vec![1]);
    assert_eq!(h.scheduler.view().binding().unwrap().child_index(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_settle_on_playing_item_schedules_nothing() {
    let mut h = Harness::attached(PlayMode::Auto, ListConfig::default());
    h.scheduler.on_layout_complete().unwrap();
    h.clear();

    h.scheduler
        .on_scroll_state_changed(ScrollState::Idle, &at(0))
        .unwrap();
    assert!(!h.scheduler.has_pending_reattach());
    assert_eq!(h.settle().await, 0);
    assert!(h.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_returning_to_playing_item_mid_scroll_reattaches() {
    let mut h = Harness::attached(PlayMode::Auto, ListConfig::default());
    h.scheduler.on_layout_complete().unwrap();

    h.scheduler.on_scroll(&at(1)).unwrap();
    h.scheduler.on_scroll(&at(0)).unwrap();
    h.scheduler
        .on_scroll_state_changed(ScrollState::Idle, &at(0))
        .unwrap();

    assert_eq!(h.settle().await, 1);
    assert_eq!(h.added_views(), vec![0, 0]);
    assert_eq!(h.scheduler.bound_position(), Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_tick_applies_debounced_reattach() {
    let mut h = Harness::attached(PlayMode::Auto, ListConfig::default());
    h.scheduler.on_layout_complete().unwrap();
    h.scroll_to(2);

    assert!(h.scheduler.tick().await.unwrap());
    assert_eq!(h.scheduler.bound_position(), Some(2));
    assert_eq!(h.added_views(), vec![0, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_custom_attach_delay() {
    let config = ListConfig::default().with_attach_delay(Duration::from_millis(500));
    let mut h = Harness::attached(PlayMode::Auto, config);
    h.scheduler.on_layout_complete().unwrap();
    h.scroll_to(4);

    assert_eq!(h.settle().await, 0);
    sleep(Duration::from_millis(300)).await;
    assert_eq!(h.scheduler.process_pending().unwrap(), 1);
    assert_eq!(h.scheduler.bound_position(), Some(4));
}

// ============================================================================
// History
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_history_resumes_recorded_offset() {
    let mut h = Harness::attached(PlayMode::Auto, history_config());
    h.scheduler.on_layout_complete().unwrap();

    h.set_position(12_000);
    h.scroll_to(1);
    assert_eq!(h.settle().await, 1);

    h.set_position(3_000);
    h.scroll_to(0);
    assert_eq!(h.settle().await, 1);

    assert_eq!(h.starts(), vec![0, 0, 12_000]);
    assert_eq!(h.scheduler.history().get(0), Some(12_000));
    assert_eq!(h.scheduler.history().get(1), Some(3_000));
}

#[tokio::test(start_paused = true)]
async fn test_history_disabled_records_nothing() {
    let mut h = Harness::attached(PlayMode::Auto, ListConfig::default());
    h.scheduler.on_layout_complete().unwrap();

    h.set_position(12_000);
    h.scroll_to(1);
    h.settle().await;
    h.scroll_to(0);
    h.settle().await;

    assert!(h.scheduler.history().is_empty());
    assert_eq!(h.starts(), vec![0, 0, 0]);
}

#[tokio::test(start_paused = true)]
async fn test_history_applies_to_clicks() {
    let mut h = Harness::attached(PlayMode::Click, history_config());
    let viewport = ListViewport::new(0, 4, ITEMS);

    h.scheduler.on_item_click(2, &viewport).unwrap();
    h.set_position(45_000);
    h.scheduler.on_item_click(3, &viewport).unwrap();
    h.scheduler.on_item_click(2, &viewport).unwrap();

    assert_eq!(h.starts(), vec![0, 0, 45_000]);
}

// ============================================================================
// Resolution failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_missing_container_keeps_waiting_for_layout() {
    let mut adapter = MockAdapter::new();
    adapter
        .expect_container_for()
        .with(eq(0), eq(0))
        .times(2)
        .returning(|_, _| None);
    adapter
        .expect_data_source_for()
        .with(eq(0))
        .times(2)
        .returning(|position| Some(clip(position)));

    let mut h = Harness::new(ListConfig::default());
    h.scheduler
        .attach_to_list(PlayMode::Auto, Box::new(adapter), None)
        .unwrap();

    h.scheduler.on_layout_complete().unwrap();
    h.scheduler.on_layout_complete().unwrap();

    assert!(h.events().is_empty());
    assert_eq!(h.scheduler.bound_position(), None);
}

#[tokio::test(start_paused = true)]
async fn test_missing_media_aborts_reattach() {
    let mut h = Harness::attached_without_media(PlayMode::Auto, ListConfig::default(), &[3]);
    h.scheduler.on_layout_complete().unwrap();

    h.scroll_to(3);
    assert_eq!(h.settle().await, 0);
    assert_eq!(h.added_views(), vec![0]);
    assert_eq!(h.scheduler.bound_position(), None);
    assert_eq!(h.scheduler.playing_position(), 0);

    // Self-heals on the next settle.
    h.scroll_to(4);
    assert_eq!(h.settle().await, 1);
    assert_eq!(h.scheduler.bound_position(), Some(4));
}

#[tokio::test(start_paused = true)]
async fn test_engine_plays_the_adapter_source_itself() {
    let source = clip(0);
    let mut h = Harness::new(ListConfig::default());

    let mut adapter = MockAdapter::new();
    let log = h.log.clone();
    adapter.expect_container_for().returning(move |_, position| {
        Some(Box::new(FakeContainer {
            position,
            log: log.clone(),
        }) as Box<dyn ItemContainer>)
    });
    let handed = Arc::clone(&source);
    adapter
        .expect_data_source_for()
        .returning(move |_| Some(Arc::clone(&handed)));

    h.scheduler
        .attach_to_list(PlayMode::Auto, Box::new(adapter), None)
        .unwrap();
    h.scheduler.on_layout_complete().unwrap();

    let playing = h.scheduler.engine().data_source().unwrap();
    assert!(DataSource::same_item(&playing, &source));
    // Same URL, different item.
    assert!(!DataSource::same_item(&playing, &clip(0)));
}

// ============================================================================
// Click-play
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_click_play_uses_child_index_relative_to_first_visible() {
    let mut h = Harness::attached(PlayMode::Click, ListConfig::default());
    let viewport = ListViewport::new(4, 3, ITEMS);

    assert!(h.scheduler.on_item_click(6, &viewport).unwrap());
    assert_eq!(
        h.events(),
        vec![
            Event::AddView(6),
            Event::Attach(2),
            Event::SetSource("clip 6".into()),
            Event::Start(0),
        ]
    );

    h.clear();
    assert!(h.scheduler.on_item_click(5, &viewport).unwrap());
    assert_eq!(
        h.events(),
        vec![
            Event::Stop,
            Event::RemoveView(6),
            Event::Detach(2),
            Event::AddView(5),
            Event::Attach(1),
            Event::SetSource("clip 5".into()),
            Event::Start(0),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_click_above_first_visible_clamps_child_index() {
    let mut h = Harness::attached(PlayMode::Click, ListConfig::default());

    h.scheduler
        .on_item_click(2, &ListViewport::new(5, 3, ITEMS))
        .unwrap();
    assert_eq!(h.scheduler.view().binding().unwrap().child_index(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_click_play_scroll_only_detaches_when_out_of_window() {
    let mut h = Harness::attached(PlayMode::Click, ListConfig::default());
    h.scheduler
        .on_item_click(5, &ListViewport::new(4, 3, ITEMS))
        .unwrap();
    h.clear();

    h.scheduler.on_scroll(&ListViewport::new(5, 3, ITEMS)).unwrap();
    h.scheduler.on_scroll(&ListViewport::new(3, 3, ITEMS)).unwrap();
    h.scheduler
        .on_scroll_state_changed(ScrollState::Idle, &ListViewport::new(3, 3, ITEMS))
        .unwrap();
    assert!(h.events().is_empty());

    h.scheduler.on_scroll(&ListViewport::new(6, 3, ITEMS)).unwrap();
    assert_eq!(
        h.events(),
        vec![Event::Stop, Event::RemoveView(5), Event::Detach(1)]
    );

    // Scrolling never attaches in click mode.
    assert_eq!(h.settle().await, 0);
    h.scheduler.on_scroll(&ListViewport::new(4, 3, ITEMS)).unwrap();
    assert!(h.added_views().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_click_ignored_in_auto_mode_and_rejected_before_attach() {
    let mut h = Harness::new(ListConfig::default());
    assert!(matches!(
        h.scheduler.on_item_click(1, &at(0)),
        Err(ListError::NotAttached)
    ));
    assert!(matches!(
        h.scheduler.set_auto_play_mode(false),
        Err(ListError::NotAttached)
    ));

    let mut h = Harness::attached(PlayMode::Auto, ListConfig::default());
    assert!(!h.scheduler.on_item_click(1, &at(0)).unwrap());
    assert!(h.events().is_empty());
}

// ============================================================================
// Mode switching
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_mode_switch_unwinds_auto_play() {
    let mut h = Harness::attached(PlayMode::Auto, ListConfig::default());
    h.scheduler.on_layout_complete().unwrap();
    h.scroll_to(2);
    assert!(h.scheduler.has_pending_reattach());

    h.scheduler.set_auto_play_mode(false).unwrap();
    assert_eq!(h.scheduler.play_mode(), Some(PlayMode::Click));
    assert!(!h.scheduler.has_pending_reattach());
    h.clear();

    // The auto-play observer is gone.
    h.scheduler.on_scroll(&at(5)).unwrap();
    h.scheduler
        .on_scroll_state_changed(ScrollState::Idle, &at(5))
        .unwrap();
    assert_eq!(h.settle().await, 0);
    assert!(h.events().is_empty());

    assert!(h.scheduler.on_item_click(5, &at(5)).unwrap());
    assert_eq!(h.added_views(), vec![5]);
}

#[tokio::test(start_paused = true)]
async fn test_switch_back_to_auto_attaches_on_next_layout() {
    let mut h = Harness::attached(PlayMode::Click, ListConfig::default());
    h.scheduler.on_item_click(3, &at(3)).unwrap();

    h.scheduler.set_auto_play_mode(false).unwrap();
    assert_eq!(h.scheduler.bound_position(), Some(3));

    h.scheduler.set_auto_play_mode(true).unwrap();
    assert_eq!(h.scheduler.bound_position(), None);

    h.scheduler.on_layout_complete().unwrap();
    assert_eq!(h.scheduler.bound_position(), Some(3));
    assert_eq!(h.added_views(), vec![3, 3]);
}

// ============================================================================
// Listener ordering
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_detach_notified_before_attach() {
    let mut seq = Sequence::new();
    let mut listener = MockListener::new();
    listener
        .expect_on_attach_item_view()
        .with(eq(0))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    listener
        .expect_on_detach_item_view()
        .with(eq(0))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    listener
        .expect_on_attach_item_view()
        .with(eq(1))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());

    let mut h = Harness::attached(PlayMode::Auto, ListConfig::default());
    h.scheduler.set_item_changed_listener(Some(Box::new(listener)));

    h.scheduler.on_layout_complete().unwrap();
    h.scheduler.on_scroll(&between(0)).unwrap();
    h.scheduler
        .on_scroll_state_changed(ScrollState::Idle, &between(0))
        .unwrap();
    assert_eq!(h.settle().await, 1);
}

// ============================================================================
// Teardown
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_host_teardown_signal_releases_engine() {
    let token = CancellationToken::new();
    let mut h = Harness::new(ListConfig::default());
    let adapter = FakeAdapter {
        log: h.log.clone(),
        without_media: HashSet::new(),
    };
    h.scheduler
        .attach_to_list(PlayMode::Auto, Box::new(adapter), Some(&token))
        .unwrap();
    h.scheduler.on_layout_complete().unwrap();
    h.scheduler.on_scroll_state_changed(ScrollState::Idle, &at(4)).unwrap();
    assert!(h.scheduler.has_pending_reattach());

    token.cancel();
    assert!(!h.scheduler.tick().await.unwrap());

    assert!(h.scheduler.is_torn_down());
    assert!(h.scheduler.engine().is_destroyed());
    assert_eq!(h.scheduler.bound_position(), None);
    assert_eq!(h.scheduler.play_mode(), None);
    assert_eq!(h.count(|e| *e == Event::Destroy), 1);
    assert_eq!(h.count(|e| *e == Event::RemoveView(0)), 1);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(h.added_views(), vec![0]);
    assert!(!h.scheduler.tick().await.unwrap());
    assert!(matches!(
        h.scheduler.on_scroll(&at(4)),
        Err(ListError::TornDown)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_host_teardown_observed_without_tick() {
    let token = CancellationToken::new();
    let mut h = Harness::new(ListConfig::default());
    let adapter = FakeAdapter {
        log: h.log.clone(),
        without_media: HashSet::new(),
    };
    h.scheduler
        .attach_to_list(PlayMode::Click, Box::new(adapter), Some(&token))
        .unwrap();

    token.cancel();
    assert!(matches!(
        h.scheduler.process_pending(),
        Err(ListError::TornDown)
    ));
    assert_eq!(h.count(|e| *e == Event::Destroy), 1);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_teardown_is_idempotent() {
    let mut h = Harness::attached(PlayMode::Click, ListConfig::default());
    h.scheduler.on_item_click(1, &at(1)).unwrap();

    h.scheduler.teardown();
    h.scheduler.teardown();

    assert_eq!(h.count(|e| *e == Event::Destroy), 1);
    assert_eq!(h.count(|e| *e == Event::RemoveView(1)), 1);
    assert_eq!(h.count(|e| *e == Event::Detach(0)), 1);
    assert!(matches!(
        h.scheduler.on_item_click(2, &at(2)),
        Err(ListError::TornDown)
    ));
    assert!(matches!(
        h.scheduler.set_decode_mode(DecodeMode::Hardware),
        Err(ListError::TornDown)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_decode_mode_forwarded_to_engine() {
    let mut h = Harness::attached(PlayMode::Auto, ListConfig::default());
    h.scheduler.set_decode_mode(DecodeMode::Hardware).unwrap();
    assert_eq!(h.events(), vec![Event::DecodeMode(DecodeMode::Hardware)]);
}

#[tokio::test(start_paused = true)]
async fn test_default_mode_comes_from_config() {
    let mut h = Harness::new(ListConfig::default().with_play_mode(PlayMode::Click));
    let adapter = FakeAdapter {
        log: h.log.clone(),
        without_media: HashSet::new(),
    };
    h.scheduler
        .attach_with_default_mode(Box::new(adapter), None)
        .unwrap();
    assert_eq!(h.scheduler.play_mode(), Some(PlayMode::Click));
}
