//! Host lifecycle bridge.
//!
//! Screens that own a list player expose a teardown signal so the scheduler
//! can release the engine without the host calling teardown explicitly.

use core_async::sync::CancellationToken;

/// A host UI container with a destroy signal.
pub trait HostLifecycle: Send + Sync {
    /// Token cancelled when the host is torn down.
    fn teardown_signal(&self) -> CancellationToken;
}

impl HostLifecycle for CancellationToken {
    fn teardown_signal(&self) -> CancellationToken {
        self.clone()
    }
}
