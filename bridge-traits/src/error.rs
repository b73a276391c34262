use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The engine's callback queue is full; the backend must retry or drop.
    #[error("Callback queue full")]
    QueueFull,

    /// The engine no longer listens on this callback binding.
    #[error("Callback binding disconnected")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, BridgeError>;
