use sonos_session::SessionError;
use state_store::RegistryError;
use thiserror::Error;

/// Result type for speaker operations
pub type Result<T> = std::result::Result<T, SpeakerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpeakerError {
    /// Write to a read-only property; never retried
    #[error("Property '{0}' is read-only")]
    RejectedWrite(String),

    /// The request is not possible in the current device state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Remote call failed: {0}")]
    Remote(#[from] SessionError),

    #[error("Registry error: {0}")]
    Registry(RegistryError),

    /// shuffle/repeat values that do not resolve to a native play mode
    #[error("No play mode for shuffle={shuffle}, repeat={repeat}")]
    UndefinedPlayMode { shuffle: String, repeat: String },

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The speaker task has stopped
    #[error("Speaker closed")]
    Closed,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<RegistryError> for SpeakerError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ReadOnly(key) => SpeakerError::RejectedWrite(key),
            other => SpeakerError::Registry(other),
        }
    }
}
