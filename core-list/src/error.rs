use core_playback::PlaybackError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListError {
    /// The scheduler was used before `attach_to_list`.
    #[error("Scheduler is not attached to a list")]
    NotAttached,

    #[error("Scheduler was torn down")]
    TornDown,

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),
}

pub type Result<T> = std::result::Result<T, ListError>;
