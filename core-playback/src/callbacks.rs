//! Bounded queue that carries raw backend callbacks onto the engine's thread.

use bridge_traits::playback::CallbackSender;
use core_async::sync::mpsc;

/// Receiving side of an engine's callback queue.
///
/// The queue keeps one sender of its own to mint bindings, so `next` waits
/// rather than returning `None` while the engine is alive.
#[derive(Debug)]
pub struct CallbackQueue<C> {
    tx: mpsc::Sender<C>,
    rx: mpsc::Receiver<C>,
    capacity: usize,
    generation: u64,
}

impl<C> CallbackQueue<C> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx,
            capacity,
            generation: 0,
        }
    }

    /// A sender for the backend, bound to the current channel.
    pub fn sender(&self) -> CallbackSender<C> {
        CallbackSender::new(self.tx.clone())
    }

    /// Replaces the channel. Senders handed out before are disconnected and
    /// anything they queued is discarded.
    pub fn renew(&mut self) -> usize {
        let (tx, rx) = mpsc::channel(self.capacity);
        let mut old = std::mem::replace(&mut self.rx, rx);
        self.tx = tx;
        self.generation += 1;

        old.close();
        let mut dropped = 0;
        while old.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    /// Pops the next queued callback without waiting.
    pub fn try_next(&mut self) -> Option<C> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next callback.
    pub async fn next(&mut self) -> Option<C> {
        self.rx.recv().await
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of times the channel was replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
