//! Single-slot state channel between an engine and its observer.
//!
//! The engine keeps at most one observer. Binding a new one replaces the old
//! one outright; there is no subscriber list. The containing view is expected
//! to fan events out to its controllers and overlays.
//!
//! Delivery is synchronous and unbuffered: an observer bound after an event
//! was emitted never sees that event.

use crate::state::{PlaybackState, PlaybackStateEvent};
use parking_lot::Mutex;
use std::sync::Arc;

/// Receives state events from an engine.
pub trait StateObserver: Send {
    fn on_state_event(&mut self, event: &PlaybackStateEvent);
}

impl<F> StateObserver for F
where
    F: FnMut(&PlaybackStateEvent) + Send,
{
    fn on_state_event(&mut self, event: &PlaybackStateEvent) {
        self(event)
    }
}

/// Identifies one binding of an observer.
///
/// Returned by [`StateEventBus::bind`] so a view can unbind itself without
/// removing an observer that replaced it in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkToken(u64);

#[derive(Default)]
pub struct StateEventBus {
    slot: Option<(SinkToken, Box<dyn StateObserver>)>,
    next_id: u64,
}

impl StateEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `observer`, dropping whichever observer was bound before.
    pub fn bind(&mut self, observer: Box<dyn StateObserver>) -> SinkToken {
        self.next_id += 1;
        let token = SinkToken(self.next_id);
        self.slot = Some((token, observer));
        token
    }

    /// Removes the current observer, if any.
    pub fn unbind(&mut self) -> bool {
        self.slot.take().is_some()
    }

    /// Removes the current observer only if it is still the one bound under `token`.
    pub fn unbind_if(&mut self, token: SinkToken) -> bool {
        match &self.slot {
            Some((current, _)) if *current == token => {
                self.slot = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.slot.is_some()
    }

    /// Delivers `event` to the bound observer; dropped when nothing is bound.
    pub fn emit(&mut self, event: PlaybackStateEvent) {
        if let Some((_, observer)) = self.slot.as_mut() {
            observer.on_state_event(&event);
        }
    }
}

impl std::fmt::Debug for StateEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateEventBus")
            .field("bound", &self.slot.as_ref().map(|(token, _)| *token))
            .finish()
    }
}

/// Observer that records every event it receives.
///
/// Clones share the same log, so one clone can be bound to an engine while
/// another is inspected.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<PlaybackStateEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PlaybackStateEvent> {
        self.events.lock().clone()
    }

    pub fn states(&self) -> Vec<PlaybackState> {
        self.events.lock().iter().map(|event| event.state).collect()
    }

    pub fn count(&self, state: PlaybackState) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.state == state)
            .count()
    }

    pub fn last(&self) -> Option<PlaybackStateEvent> {
        self.events.lock().last().copied()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl StateObserver for EventRecorder {
    fn on_state_event(&mut self, event: &PlaybackStateEvent) {
        self.events.lock().push(*event);
    }
}
