//! Error types for the session engine

use thiserror::Error;

/// Main error type for session-engine operations
#[derive(Error, Debug)]
pub enum Error {
    /// Plugin file not found
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    /// Failed to load plugin
    #[error("Failed to load plugin: {0}")]
    PluginLoadFailed(String),

    /// The session does not know how to build this kind of plugin
    #[error("Unknown plugin type: {0}")]
    UnknownPluginType(String),

    /// No registered format matches the description's format name
    #[error("Unknown plugin format: {0}")]
    UnknownFormat(String),

    /// A rack identifier that does not refer to a rack in the edit
    #[error("Rack not found: {0}")]
    RackNotFound(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// COM/VST3 interface error
    #[error("VST3 interface error: {0}")]
    InterfaceError(String),

    /// Audio file could not be opened or decoded
    #[error("Audio file error: {0}")]
    AudioFile(String),

    /// Audio backend error
    #[error("Audio backend error: {0}")]
    AudioBackendError(String),

    /// Native window could not be created or used
    #[error("Window error: {0}")]
    WindowError(String),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;
