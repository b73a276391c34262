//! Scheduler settings derived from [`CoreConfig`].

use core_async::time::Duration;
use core_runtime::config::CoreConfig;

/// How the scheduler decides which list item plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Playback follows the scroll position.
    Auto,
    /// Playback starts only when an item is clicked.
    Click,
}

impl PlayMode {
    pub fn from_auto_play(auto_play: bool) -> Self {
        if auto_play {
            PlayMode::Auto
        } else {
            PlayMode::Click
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, PlayMode::Auto)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListConfig {
    /// Mode used by `attach_to_list` when the host does not pick one.
    pub play_mode: PlayMode,

    /// Remember the playback offset of each position and resume from it.
    pub support_history: bool,

    /// Debounce window between scroll-settle and reattachment.
    ///
    /// Default: 200ms.
    pub attach_delay: Duration,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self::from(&CoreConfig::default())
    }
}

impl ListConfig {
    pub fn with_play_mode(mut self, mode: PlayMode) -> Self {
        self.play_mode = mode;
        self
    }

    pub fn with_support_history(mut self, enabled: bool) -> Self {
        self.support_history = enabled;
        self
    }

    pub fn with_attach_delay(mut self, delay: Duration) -> Self {
        self.attach_delay = delay;
        self
    }
}

impl From<&CoreConfig> for ListConfig {
    fn from(config: &CoreConfig) -> Self {
        Self {
            play_mode: PlayMode::from_auto_play(config.features.auto_play),
            support_history: config.features.support_history,
            attach_delay: config.attach_delay,
        }
    }
}
