//! Integration tests for logging and configuration

use bridge_traits::logging::LogLevel;
use core_runtime::config::{CoreConfig, EngineKind};
use core_runtime::logging::{
    init_logging, redact_url, strip_path, LogFormat, LoggingConfig,
};
use std::time::Duration;

#[test]
fn test_logging_config_defaults() {
    let config = LoggingConfig::default();

    #[cfg(debug_assertions)]
    assert_eq!(config.format, LogFormat::Pretty);
    #[cfg(not(debug_assertions))]
    assert_eq!(config.format, LogFormat::Json);

    assert_eq!(config.level, LogLevel::Info);
    assert!(config.redact_urls);
    assert!(config.logger_sink.is_none());
}

#[test]
fn test_init_logging_only_once() {
    let first = init_logging(LoggingConfig::default().with_format(LogFormat::Compact));
    assert!(first.is_ok());

    // A global subscriber is already installed for this process.
    let second = init_logging(LoggingConfig::default());
    assert!(second.is_err());

    tracing::info!(target: "core_list", position = 1, "logging installed");
}

#[test]
fn test_invalid_filter_is_config_error() {
    let result = init_logging(LoggingConfig::default().with_filter("core_list=loudest"));
    assert!(matches!(result, Err(core_runtime::Error::Config(_))));
}

#[test]
fn test_signed_urls_are_redacted() {
    let url = "https://cdn.example.com/feed/7/master.m3u8?Expires=1&Signature=abc";
    let redacted = redact_url(url);
    assert_eq!(redacted, "https://cdn.example.com/feed/7/master.m3u8");
    assert!(!redacted.contains("Signature"));
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/data/user/0/app/cache/clip.mp4"), "clip.mp4");
    assert_eq!(strip_path("D:\\media\\clip.mp4"), "clip.mp4");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_config_from_json_document() {
    let json = r#"{
        "engine_kind": "streaming",
        "decode_mode": "hardware",
        "features": { "auto_play": false, "support_history": true },
        "attach_delay": 250,
        "callback_queue_capacity": 16
    }"#;

    let config = CoreConfig::from_json(json).unwrap();
    assert_eq!(config.engine_kind, EngineKind::Streaming);
    assert!(!config.decode_mode.is_software());
    assert!(!config.features.auto_play);
    assert!(config.features.support_history);
    assert_eq!(config.attach_delay, Duration::from_millis(250));
    assert_eq!(config.callback_queue_capacity, 16);
    assert_eq!(config.playback_speed, 1.0);
}
