//! Error types for beo-state

use std::fmt;

use beo_stream::DeviceId;

/// Result type for beo-state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors surfaced by the state layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The device reported a playback failure
    Playback {
        device_id: DeviceId,
        message: String,
    },
}

impl StateError {
    pub fn device_id(&self) -> &DeviceId {
        match self {
            StateError::Playback { device_id, .. } => device_id,
        }
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Playback { device_id, message } => {
                write!(f, "Playback error on {}: {}", device_id, message)
            }
        }
    }
}

impl std::error::Error for StateError {}
