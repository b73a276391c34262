//! Synchronization primitives.
//!
//! Decoder backends run their own worker threads. Their callbacks are posted
//! into a bounded [`mpsc`] channel and drained on the thread that owns the
//! engine; no engine field is ever written from a backend thread.
//!
//! Hosts signal teardown of a list screen through a [`CancellationToken`].

pub use tokio::sync::{mpsc, oneshot, watch, Mutex, Notify};
pub use tokio_util::sync::{CancellationToken, DropGuard, WaitForCancellationFuture};
