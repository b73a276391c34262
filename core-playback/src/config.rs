//! # Engine Configuration
//!
//! Per-engine settings derived from the shared
//! [`CoreConfig`](core_runtime::config::CoreConfig).

use core_runtime::config::{CoreConfig, DecodeMode, EngineKind};
use serde::{Deserialize, Serialize};

/// Settings an engine is created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Backend the host is expected to supply.
    #[serde(default)]
    pub engine_kind: EngineKind,

    /// Decoder selection. Applied by the native decoder on every open; the
    /// streaming engine only supports hardware decoding.
    #[serde(default)]
    pub decode_mode: DecodeMode,

    /// Capacity of the backend callback queue.
    ///
    /// Default: 64.
    #[serde(default = "default_callback_queue_capacity")]
    pub callback_queue_capacity: usize,

    /// Default: 1.0.
    #[serde(default = "default_playback_speed")]
    pub playback_speed: f32,

    /// Log every raw backend callback at trace level.
    #[serde(default)]
    pub trace_backend_callbacks: bool,

    /// Package that owns raw resources, used to build `android.resource://` locators.
    #[serde(default = "default_resource_package")]
    pub resource_package: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_kind: EngineKind::default(),
            decode_mode: DecodeMode::default(),
            callback_queue_capacity: default_callback_queue_capacity(),
            playback_speed: default_playback_speed(),
            trace_backend_callbacks: false,
            resource_package: default_resource_package(),
        }
    }
}

impl EngineConfig {
    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    pub fn with_callback_queue_capacity(mut self, capacity: usize) -> Self {
        self.callback_queue_capacity = capacity.max(1);
        self
    }

    pub fn with_trace_backend_callbacks(mut self, enabled: bool) -> Self {
        self.trace_backend_callbacks = enabled;
        self
    }

    pub fn with_resource_package(mut self, package: impl Into<String>) -> Self {
        self.resource_package = package.into();
        self
    }
}

impl From<&CoreConfig> for EngineConfig {
    fn from(config: &CoreConfig) -> Self {
        Self {
            engine_kind: config.engine_kind,
            decode_mode: config.decode_mode,
            callback_queue_capacity: config.callback_queue_capacity,
            playback_speed: config.playback_speed,
            trace_backend_callbacks: config.trace_backend_callbacks,
            resource_package: default_resource_package(),
        }
    }
}

fn default_callback_queue_capacity() -> usize {
    64
}

fn default_playback_speed() -> f32 {
    1.0
}

fn default_resource_package() -> String {
    "app".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_from_core_config() {
        let core = CoreConfig::builder()
            .engine_kind(EngineKind::NativeDecoder)
            .decode_mode(DecodeMode::Hardware)
            .callback_queue_capacity(8)
            .trace_backend_callbacks(true)
            .build()
            .unwrap();

        let config = EngineConfig::from(&core);
        assert_eq!(config.engine_kind, EngineKind::NativeDecoder);
        assert_eq!(config.decode_mode, DecodeMode::Hardware);
        assert_eq!(config.callback_queue_capacity, 8);
        assert!(config.trace_backend_callbacks);
        assert_eq!(config.resource_package, "app");
    }

    #[test]
    fn test_queue_capacity_never_zero() {
        let config = EngineConfig::default().with_callback_queue_capacity(0);
        assert_eq!(config.callback_queue_capacity, 1);
    }
}
