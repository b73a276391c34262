//! # Core Configuration Module
//!
//! Settings shared by the playback engines and the list scheduler.
//!
//! ## Overview
//!
//! A `CoreConfig` is built once by the host, either through
//! [`CoreConfig::builder`] or by deserializing JSON (e.g. a remote-config
//! payload), and then converted into the per-crate views
//! (`core_playback::EngineConfig`, `core_list::ListConfig`). Validation is
//! fail-fast: `build()` and `from_json()` both refuse out-of-range values.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::{CoreConfig, DecodeMode, EngineKind};
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .engine_kind(EngineKind::NativeDecoder)
//!     .decode_mode(DecodeMode::Hardware)
//!     .auto_play(false)
//!     .support_history(true)
//!     .attach_delay(Duration::from_millis(150))
//!     .build()
//!     .expect("valid config");
//!
//! assert!(config.features.support_history);
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! CoreConfig::builder()
//!     .attach_delay(Duration::ZERO)
//!     .build()
//!     .expect("zero debounce window is rejected");
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted debounce window before a scroll-driven reattachment.
pub const MAX_ATTACH_DELAY: Duration = Duration::from_secs(5);

/// Which decoding backend drives playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Adaptive-streaming backend (progressive, DASH, HLS, smooth streaming, RTMP).
    #[default]
    Streaming,
    /// General-purpose native decoder.
    NativeDecoder,
}

/// Decoder selection passed through to the active engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeMode {
    #[default]
    Software,
    Hardware,
}

impl DecodeMode {
    pub fn is_software(&self) -> bool {
        matches!(self, DecodeMode::Software)
    }
}

/// Feature toggles for list playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Follow scroll position without user interaction. When disabled,
    /// playback starts only on item click.
    #[serde(default = "default_auto_play")]
    pub auto_play: bool,

    /// Remember the playback offset per list position and resume from it.
    #[serde(default)]
    pub support_history: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            auto_play: default_auto_play(),
            support_history: false,
        }
    }
}

/// Core configuration for the player core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub engine_kind: EngineKind,

    #[serde(default)]
    pub decode_mode: DecodeMode,

    #[serde(default)]
    pub features: FeatureFlags,

    /// Debounce window between scroll-settle and reattachment.
    ///
    /// Default: 200 ms.
    #[serde(default = "default_attach_delay", with = "duration_millis")]
    pub attach_delay: Duration,

    /// Capacity of each engine's backend callback queue.
    ///
    /// Default: 64.
    #[serde(default = "default_callback_queue_capacity")]
    pub callback_queue_capacity: usize,

    /// Initial playback speed.
    ///
    /// Default: 1.0.
    #[serde(default = "default_playback_speed")]
    pub playback_speed: f32,

    /// Log every raw backend callback at trace level before reconciliation.
    #[serde(default)]
    pub trace_backend_callbacks: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            engine_kind: EngineKind::default(),
            decode_mode: DecodeMode::default(),
            features: FeatureFlags::default(),
            attach_delay: default_attach_delay(),
            callback_queue_capacity: default_callback_queue_capacity(),
            playback_speed: default_playback_speed(),
            trace_backend_callbacks: false,
        }
    }
}

impl CoreConfig {
    /// Creates a new builder seeded with defaults.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Parses and validates a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CoreConfig = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid configuration JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Internal(format!("Failed to serialize configuration: {}", e)))
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Attach delay is within 1 ms ..= 5 s
    /// - Callback queue capacity is non-zero
    /// - Playback speed is finite and positive
    pub fn validate(&self) -> Result<()> {
        if self.attach_delay < Duration::from_millis(1) {
            return Err(Error::Config(
                "Attach delay must be at least 1ms".to_string(),
            ));
        }

        if self.attach_delay > MAX_ATTACH_DELAY {
            return Err(Error::Config(format!(
                "Attach delay exceeds maximum of {}ms",
                MAX_ATTACH_DELAY.as_millis()
            )));
        }

        if self.callback_queue_capacity == 0 {
            return Err(Error::Config(
                "Callback queue capacity must be greater than 0".to_string(),
            ));
        }

        if !self.playback_speed.is_finite() || self.playback_speed <= 0.0 {
            return Err(Error::Config(format!(
                "Playback speed must be positive, got {}",
                self.playback_speed
            )));
        }

        Ok(())
    }
}

/// Builder for [`CoreConfig`].
#[derive(Debug, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    pub fn engine_kind(mut self, kind: EngineKind) -> Self {
        self.config.engine_kind = kind;
        self
    }

    pub fn decode_mode(mut self, mode: DecodeMode) -> Self {
        self.config.decode_mode = mode;
        self
    }

    pub fn auto_play(mut self, auto_play: bool) -> Self {
        self.config.features.auto_play = auto_play;
        self
    }

    pub fn support_history(mut self, enabled: bool) -> Self {
        self.config.features.support_history = enabled;
        self
    }

    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.config.features = features;
        self
    }

    pub fn attach_delay(mut self, delay: Duration) -> Self {
        self.config.attach_delay = delay;
        self
    }

    pub fn callback_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.callback_queue_capacity = capacity;
        self
    }

    pub fn playback_speed(mut self, speed: f32) -> Self {
        self.config.playback_speed = speed;
        self
    }

    pub fn trace_backend_callbacks(mut self, enabled: bool) -> Self {
        self.config.trace_backend_callbacks = enabled;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<CoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_auto_play() -> bool {
    true
}

fn default_attach_delay() -> Duration {
    Duration::from_millis(200)
}

fn default_callback_queue_capacity() -> usize {
    64
}

fn default_playback_speed() -> f32 {
    1.0
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
