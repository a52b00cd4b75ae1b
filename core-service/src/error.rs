use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),

    #[error("Subtitle error: {0}")]
    Subtitle(#[from] core_subtitles::FormatError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
