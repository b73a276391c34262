//! Workspace facade crate.
//!
//! Re-exports the player core so host applications can depend on
//! `liteplayer-workspace` alone. The list scheduler sits behind the `list`
//! feature (on by default).

pub use bridge_traits as bridge;
pub use core_playback as playback;
pub use core_runtime as runtime;

#[cfg(feature = "list")]
pub use core_list as list;

pub use core_playback::{create_engine, Backend, DataSource, EngineConfig, PlaybackEngine};
pub use core_runtime::config::CoreConfig;
pub use core_runtime::logging::{init_logging, LoggingConfig};

#[cfg(feature = "list")]
pub use core_list::{ListConfig, ListPlaybackScheduler, PlayMode};
