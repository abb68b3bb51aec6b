use thiserror::Error;

/// Errors returned by device API collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The device runs firmware newer than this client's API model
    #[error("API version mismatch: {0}")]
    VersionMismatch(String),

    /// Any other request failure
    #[error("Request failed: {0}")]
    Request(String),
}

/// Errors that can occur in the event manager
#[derive(Error, Debug)]
pub enum EventManagerError {
    /// Invalid session configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A device API call failed
    #[error("Device API error: {0}")]
    Api(#[from] ApiError),

    /// A background worker panicked or was cancelled
    #[error("Worker stopped unexpectedly")]
    WorkerStopped,
}

/// Result type for event manager operations
pub type Result<T> = std::result::Result<T, EventManagerError>;
