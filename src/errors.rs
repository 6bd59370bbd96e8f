use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No home directory found for the settings and session files")]
    NoProjectDirs,

    #[error("Engine error: {0}")]
    Engine(#[from] session_engine::Error),

    #[error("Settings error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
