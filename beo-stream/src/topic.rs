//! Topics and the payloads delivered on them

use std::fmt;

use crate::device_id::DeviceId;
use crate::key_event::KeyEvent;
use crate::notification::{
    ListeningModeRef, PlaybackContentMetadata, PlaybackError, PlaybackProgress, RenderingState,
    SoftwareUpdateState, Source, VolumeState,
};

/// Fan-out key used by the [`NotificationRouter`](crate::NotificationRouter)
///
/// The set is closed. `Button` and `RemoteKey` are parameterized by a key
/// extracted from the notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    PlaybackState,
    PlaybackProgress,
    PlaybackMetadata,
    PlaybackSource,
    SourceChange,
    Volume,
    ConnectionStatus,
    /// Peers, listeners and available listeners changed; re-query
    Beolink,
    /// Device configuration (e.g. friendly name) changed; re-query
    Configuration,
    /// Remote menu (video sources) changed; re-query
    RemoteMenuChanged,
    /// Device button, keyed by button id
    Button(String),
    /// Beoremote key, keyed by `submenu/key`
    RemoteKey(String),
    SoftwareUpdate,
    ActiveListeningMode,
    PlaybackError,
}

impl Topic {
    pub fn button(id: impl Into<String>) -> Self {
        Topic::Button(id.into())
    }

    pub fn remote_key(path: impl Into<String>) -> Self {
        Topic::RemoteKey(path.into())
    }

    /// Topics whose subscribers receive [`Payload::Empty`]
    pub fn is_signal_only(&self) -> bool {
        matches!(
            self,
            Topic::Beolink | Topic::Configuration | Topic::RemoteMenuChanged
        )
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::PlaybackState => f.write_str("PlaybackState"),
            Topic::PlaybackProgress => f.write_str("PlaybackProgress"),
            Topic::PlaybackMetadata => f.write_str("PlaybackMetadata"),
            Topic::PlaybackSource => f.write_str("PlaybackSource"),
            Topic::SourceChange => f.write_str("SourceChange"),
            Topic::Volume => f.write_str("Volume"),
            Topic::ConnectionStatus => f.write_str("ConnectionStatus"),
            Topic::Beolink => f.write_str("Beolink"),
            Topic::Configuration => f.write_str("Configuration"),
            Topic::RemoteMenuChanged => f.write_str("RemoteMenuChanged"),
            Topic::Button(id) => write!(f, "Button:{}", id),
            Topic::RemoteKey(path) => write!(f, "RemoteKey:{}", path),
            Topic::SoftwareUpdate => f.write_str("SoftwareUpdate"),
            Topic::ActiveListeningMode => f.write_str("ActiveListeningMode"),
            Topic::PlaybackError => f.write_str("PlaybackError"),
        }
    }
}

/// Value handed to topic subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    PlaybackState(RenderingState),
    PlaybackProgress(PlaybackProgress),
    PlaybackMetadata(PlaybackContentMetadata),
    PlaybackSource(Source),
    SourceChange(Source),
    Volume(VolumeState),
    SoftwareUpdate(SoftwareUpdateState),
    ActiveListeningMode(ListeningModeRef),
    PlaybackError(PlaybackError),
    /// Translated button / remote key event
    Key(KeyEvent),
    ConnectionStatus { device_id: DeviceId, connected: bool },
    /// No payload; subscribers re-query the device
    Empty,
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }
}
