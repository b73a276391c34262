//! Cancellable delayed messages.
//!
//! A [`DelayedTask`] owns at most one in-flight timer. Scheduling a new
//! message aborts the previous timer before spawning the next one, so two
//! deliveries for the same owner can never be pending at once. Each delivery
//! is stamped with a generation; a message that was already queued when its
//! timer got superseded or cancelled is rejected by [`DelayedTask::accept`].
//!
//! The timer task only *sends* the message. The owner receives it on its own
//! thread and acts on it there.

use crate::sync::mpsc;
use crate::task::{spawn, JoinHandle};
use crate::time::{sleep, Duration};
use tracing::trace;

/// Message delivered by a [`DelayedTask`] once its delay elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    generation: u64,
    payload: T,
}

impl<T> Fired<T> {
    /// Generation stamped on this delivery.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Single-slot cancellable delayed task.
#[derive(Debug, Default)]
pub struct DelayedTask {
    handle: Option<JoinHandle<()>>,
    generation: u64,
    armed: bool,
}

impl DelayedTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `payload` to be sent on `tx` after `delay`, replacing any
    /// pending delivery. Returns the generation of the new delivery.
    pub fn schedule<T>(&mut self, delay: Duration, tx: mpsc::Sender<Fired<T>>, payload: T) -> u64
    where
        T: Send + 'static,
    {
        self.cancel();
        self.armed = true;
        let generation = self.generation;
        self.handle = Some(spawn(async move {
            sleep(delay).await;
            if tx.send(Fired { generation, payload }).await.is_err() {
                trace!(generation, "delayed task receiver dropped before delivery");
            }
        }));
        generation
    }

    /// Cancels the pending delivery, if any.
    ///
    /// Returns `true` if a delivery was armed. A message that already reached
    /// the channel is invalidated as well.
    pub fn cancel(&mut self) -> bool {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        let was_armed = std::mem::replace(&mut self.armed, false);
        self.generation = self.generation.wrapping_add(1);
        was_armed
    }

    /// Returns `true` while a delivery is scheduled and not yet accepted.
    pub fn is_pending(&self) -> bool {
        self.armed
    }

    /// Current generation counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Consumes a delivered message, returning its payload only if it belongs
    /// to the currently armed generation.
    pub fn accept<T>(&mut self, fired: Fired<T>) -> Option<T> {
        if !self.armed || fired.generation != self.generation {
            trace!(
                generation = fired.generation,
                current = self.generation,
                "dropping stale delayed delivery"
            );
            return None;
        }
        self.armed = false;
        self.handle = None;
        self.generation = self.generation.wrapping_add(1);
        Some(fired.payload)
    }
}

impl Drop for DelayedTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
