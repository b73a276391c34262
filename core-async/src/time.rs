//! Time-related re-exports.
//!
//! All timers go through tokio so tests can drive them with a paused clock
//! (`#[tokio::test(start_paused = true)]`).

pub use tokio::time::{interval, sleep, sleep_until, timeout, Interval, Sleep, Timeout};

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
///
/// Playback offsets are exchanged with decoder backends as millisecond
/// integers, so this is the one place that conversion happens.
pub fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
