//! # Core Runtime Module
//!
//! Ambient infrastructure shared by the player crates:
//! - Logging and tracing setup, including host `LoggerSink` mirroring
//! - Configuration loading and validation
//!
//! Nothing here knows about playback state; `core-playback` and `core-list`
//! derive their own config views from [`config::CoreConfig`].

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CoreConfig, DecodeMode, EngineKind, FeatureFlags};
pub use error::{Error, Result};
