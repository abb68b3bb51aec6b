//! Playback state enumeration

use serde::{Deserialize, Serialize};

/// Playback state of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing playing, or the device reported an error / standby
    Idle,
    /// Playing or buffering
    Playing,
    /// Paused, stopped or at the end of the content
    Paused,
    /// No playback state reported yet
    #[default]
    Unknown,
}

impl PlaybackState {
    /// Map a device rendering state string
    ///
    /// Unrecognised or absent values map to `Idle`.
    pub fn from_device(state: Option<&str>) -> Self {
        match state {
            Some("started" | "buffering") => PlaybackState::Playing,
            Some("paused" | "stopped" | "ended") => PlaybackState::Paused,
            _ => PlaybackState::Idle,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}
