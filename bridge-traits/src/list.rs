//! List widget bridge traits.
//!
//! The host list widget owns scrolling and view recycling. The core only needs
//! three things from it: a container to put the shared player view into, the
//! data source for an adapter position, and a description of what is
//! currently visible.

use crate::playback::DataSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Identity of the single shared player view that moves between list items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

/// A list item's view group able to host the player view.
pub trait ItemContainer: Send {
    /// Adds the player view as a child. The view never has another parent at this point.
    fn add_view(&mut self, view: ViewId);

    /// Removes the player view from this container.
    fn remove_view(&mut self, view: ViewId);
}

/// Supplies containers and data sources for adapter positions.
pub trait ListAdapter: Send {
    /// Container of the item at `position`, which is the `child_index`-th
    /// visible child of the list. `None` if the item is not laid out.
    fn container_for(&mut self, child_index: usize, position: usize)
        -> Option<Box<dyn ItemContainer>>;

    /// Data source for `position`, or `None` if the item has no media.
    fn data_source_for(&mut self, position: usize) -> Option<Arc<DataSource>>;
}

/// Notified when the player view enters or leaves a list item.
///
/// A detach for the previous item is always delivered before the attach for
/// the next one.
pub trait ItemChangedListener: Send {
    fn on_attach_item_view(&mut self, child_index: usize);

    fn on_detach_item_view(&mut self, old_child_index: usize);
}

/// Scroll phase reported by the host list widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollState {
    Idle,
    TouchScroll,
    Fling,
}

/// Snapshot of the list's visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListViewport {
    /// Adapter position of the first (possibly partially) visible item.
    pub first_visible: usize,
    /// Number of visible items, partially visible ones included.
    pub visible_count: usize,
    /// Total number of items in the adapter.
    pub total_count: usize,
    /// Top edge of the first visible child relative to the list's top, in
    /// pixels. Negative when the child is partly scrolled off. `None` when the
    /// list has no children laid out.
    pub first_child_top: Option<i32>,
}

impl ListViewport {
    pub fn new(first_visible: usize, visible_count: usize, total_count: usize) -> Self {
        Self {
            first_visible,
            visible_count,
            total_count,
            first_child_top: Some(0),
        }
    }

    pub fn with_first_child_top(mut self, top: Option<i32>) -> Self {
        self.first_child_top = top;
        self
    }

    /// Adapter position of the last (possibly partially) visible item.
    pub fn last_visible(&self) -> usize {
        self.first_visible + self.visible_count.saturating_sub(1)
    }

    /// First item whose top edge is at or below the list's top edge.
    ///
    /// Returns `None` when no child is laid out.
    pub fn first_fully_visible(&self) -> Option<usize> {
        let top = self.first_child_top?;
        if top < 0 {
            Some(self.first_visible + 1)
        } else {
            Some(self.first_visible)
        }
    }

    /// Returns `true` if `position` lies inside the visible window.
    pub fn contains(&self, position: usize) -> bool {
        self.visible_count > 0 && position >= self.first_visible && position <= self.last_visible()
    }
}
