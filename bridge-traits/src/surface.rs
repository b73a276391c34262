//! Rendering surface handle.
//!
//! Surfaces are created and destroyed by the consuming view. The core only
//! passes the opaque handle through to the decoder backend.

use serde::{Deserialize, Serialize};

/// Opaque handle to a host rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}
