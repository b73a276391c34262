//! Runtime abstraction layer for the lite-player core.
//!
//! Every core crate reaches the async runtime through this crate instead of
//! depending on tokio directly. The player core is single-threaded with
//! respect to UI calls; the only pieces that need the runtime are:
//!
//! - `delay`: the cancellable delayed message used for debounced list reattachment
//! - `sync`: bounded channels that marshal decoder callbacks onto the owning thread,
//!   and the `CancellationToken` hosts use to signal teardown
//! - `time` / `task`: thin re-exports for the above
//!
//! # Examples
//!
//! ```rust
//! use core_async::delay::DelayedTask;
//! use core_async::sync::mpsc;
//! use core_async::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (tx, mut rx) = mpsc::channel(4);
//! let mut task = DelayedTask::new();
//! task.schedule(Duration::from_millis(5), tx.clone(), "first");
//! // Rescheduling replaces the pending message.
//! task.schedule(Duration::from_millis(5), tx, "second");
//! let fired = rx.recv().await.unwrap();
//! assert_eq!(task.accept(fired), Some("second"));
//! # }
//! ```

pub mod delay;
pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use delay::DelayedTask;
/// Waits on several futures, running the branch of the first to complete.
pub use tokio::select;
pub use task::spawn;
pub use time::{sleep, Duration, Instant};
