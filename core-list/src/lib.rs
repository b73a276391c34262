//! # List Playback
//!
//! Plays media inline in a scrolling list with a single shared engine.
//!
//! ## Overview
//!
//! - [`ListPlaybackScheduler`] decides which list position the engine serves
//! - [`PlayerView`] is the one player view, bound to at most one item through
//!   a [`ViewBinding`] token
//! - [`HistoryCache`] remembers where each position stopped
//!
//! ## Usage
//!
//! ```ignore
//! use core_list::{ListConfig, ListPlaybackScheduler, PlayMode};
//!
//! let mut scheduler = ListPlaybackScheduler::new(engine, ListConfig::from(&core_config));
//! scheduler.attach_to_list(PlayMode::Auto, Box::new(adapter), Some(&host))?;
//!
//! // From the list widget's callbacks:
//! scheduler.on_layout_complete()?;
//! scheduler.on_scroll(&viewport)?;
//! scheduler.on_scroll_state_changed(ScrollState::Idle, &viewport)?;
//!
//! // Event loop:
//! while scheduler.tick().await? {}
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod scheduler;
pub mod view;

pub use config::{ListConfig, PlayMode};
pub use error::{ListError, Result};
pub use history::HistoryCache;
pub use scheduler::ListPlaybackScheduler;
pub use view::{PlayerView, ViewBinding};
