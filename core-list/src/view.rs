//! The shared player view and its binding to a list item.
//!
//! One [`PlayerView`] exists per scheduler. It is bound to at most one item
//! container at a time; the [`ViewBinding`] token records which one and is
//! moved out on detach, never copied.

use bridge_traits::list::{ItemContainer, ViewId};
use std::fmt;

/// Ownership token for the item currently hosting the player view.
pub struct ViewBinding {
    container: Box<dyn ItemContainer>,
    position: usize,
    child_index: usize,
}

impl ViewBinding {
    /// Adapter position of the bound item.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Index of the bound item among the list's visible children at attach time.
    pub fn child_index(&self) -> usize {
        self.child_index
    }
}

impl fmt::Debug for ViewBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewBinding")
            .field("position", &self.position)
            .field("child_index", &self.child_index)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct PlayerView {
    id: ViewId,
    binding: Option<ViewBinding>,
}

impl Default for PlayerView {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerView {
    pub fn new() -> Self {
        Self {
            id: ViewId::new(),
            binding: None,
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn binding(&self) -> Option<&ViewBinding> {
        self.binding.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.binding.is_some()
    }

    /// Adds the view to `container`.
    ///
    /// The previous container, if any, loses the view first. Returns the
    /// binding that was replaced.
    pub fn attach(
        &mut self,
        mut container: Box<dyn ItemContainer>,
        position: usize,
        child_index: usize,
    ) -> Option<ViewBinding> {
        let previous = self.detach();
        container.add_view(self.id);
        self.binding = Some(ViewBinding {
            container,
            position,
            child_index,
        });
        previous
    }

    /// Removes the view from its container and hands back the binding.
    pub fn detach(&mut self) -> Option<ViewBinding> {
        let mut binding = self.binding.take()?;
        binding.container.remove_view(self.id);
        Some(binding)
    }
}
