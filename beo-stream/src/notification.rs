//! Typed notifications as emitted by the device link
//!
//! Every wire message kind is one variant of [`Notification`]. Payload field
//! names follow the device's camelCase JSON so a link implementation can
//! decode frames straight into these types with `serde_json`. All fields are
//! optional on the wire; the router decides which ones a kind requires.

use serde::{Deserialize, Serialize};

/// One decoded message from the link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", content = "eventData")]
pub enum Notification {
    #[serde(rename = "WebSocketEventPlaybackState")]
    PlaybackState(RenderingState),
    #[serde(rename = "WebSocketEventPlaybackProgress")]
    PlaybackProgress(PlaybackProgress),
    #[serde(rename = "WebSocketEventPlaybackMetadata")]
    PlaybackMetadata(PlaybackContentMetadata),
    /// The "now playing" source; also announces source availability changes
    #[serde(rename = "WebSocketEventPlaybackSource")]
    PlaybackSource(Source),
    #[serde(rename = "WebSocketEventSourceChange")]
    SourceChange(Source),
    #[serde(rename = "WebSocketEventVolume")]
    Volume(VolumeState),
    #[serde(rename = "WebSocketEventSoftwareUpdateState")]
    SoftwareUpdate(SoftwareUpdateState),
    #[serde(rename = "WebSocketEventActiveListeningMode")]
    ActiveListeningMode(ListeningModeRef),
    #[serde(rename = "WebSocketEventPlaybackError")]
    PlaybackError(PlaybackError),
    #[serde(rename = "WebSocketEventButton")]
    Button(ButtonEvent),
    #[serde(rename = "WebSocketEventBeoRemoteButton")]
    RemoteKey(BeoRemoteButton),
    /// Generic notification carrying only a sub-type tag
    #[serde(rename = "WebSocketEventNotification")]
    Tagged(NotificationTag),
}

impl Notification {
    /// Short name of the wire kind, used in logs and diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::PlaybackState(_) => "playback_state",
            Notification::PlaybackProgress(_) => "playback_progress",
            Notification::PlaybackMetadata(_) => "playback_metadata",
            Notification::PlaybackSource(_) => "playback_source",
            Notification::SourceChange(_) => "source_change",
            Notification::Volume(_) => "volume",
            Notification::SoftwareUpdate(_) => "software_update",
            Notification::ActiveListeningMode(_) => "active_listening_mode",
            Notification::PlaybackError(_) => "playback_error",
            Notification::Button(_) => "button",
            Notification::RemoteKey(_) => "beo_remote_button",
            Notification::Tagged(_) => "notification",
        }
    }
}

// ============================================================================
// Playback
// ============================================================================

/// Device rendering state, e.g. `"started"`, `"paused"`, `"buffering"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderingState {
    pub value: Option<String>,
}

impl RenderingState {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}

/// Elapsed playback time in seconds
///
/// Signed on purpose: some firmware reports negative values around track
/// changes. Consumers clamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackProgress {
    pub progress: Option<i64>,
    pub total_duration: Option<i64>,
}

impl PlaybackProgress {
    pub fn new(progress: i64) -> Self {
        Self {
            progress: Some(progress),
            total_duration: None,
        }
    }
}

/// One artwork entry of the playback metadata
///
/// Net radio reports a resolution `key` such as `"600x600"`, everything else
/// reports a size class in `size` (`"small"`, `"medium"`, `"large"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Art {
    pub url: Option<String>,
    pub key: Option<String>,
    pub size: Option<String>,
    #[serde(default)]
    pub has_local_image: bool,
}

/// Beolink leader the device is currently listening to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeolinkLeader {
    pub friendly_name: Option<String>,
    pub jid: Option<String>,
}

/// Metadata for the currently playing content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackContentMetadata {
    pub title: Option<String>,
    pub album_name: Option<String>,
    pub artist_name: Option<String>,
    pub track: Option<i64>,
    pub total_duration_seconds: Option<i64>,
    /// `None` when the device sent no art list, `Some(vec![])` when it sent an empty one
    pub art: Option<Vec<Art>>,
    pub organization: Option<String>,
    pub remote_leader: Option<BeolinkLeader>,
}

/// Playback error reported by the device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackError {
    pub error: Option<String>,
}

// ============================================================================
// Sources, volume, software
// ============================================================================

/// An audio source as reported by source-change / playback-source events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: Option<String>,
    pub name: Option<String>,
    pub is_seekable: Option<bool>,
}

impl Source {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            is_seekable: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeLevel {
    pub level: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMute {
    pub muted: Option<bool>,
}

/// Volume notification; either half may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeState {
    pub level: Option<VolumeLevel>,
    pub muted: Option<VolumeMute>,
}

impl VolumeState {
    pub fn new(level: Option<i64>, muted: Option<bool>) -> Self {
        Self {
            level: level.map(|level| VolumeLevel { level: Some(level) }),
            muted: muted.map(|muted| VolumeMute { muted: Some(muted) }),
        }
    }
}

/// Software update progress, e.g. `value = "idle"` / `"downloading"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareUpdateState {
    pub seconds_remaining: Option<i64>,
    pub value: Option<String>,
}

/// Active listening mode (sound mode) reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningModeRef {
    pub id: Option<i64>,
    pub name: Option<String>,
}

// ============================================================================
// Keys and tags
// ============================================================================

/// Physical button on the device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonEvent {
    /// Button identifier, e.g. `"Preset1"` or `"PlayPause"`
    pub button: Option<String>,
    /// Raw key state, e.g. `"shortPress (Release)"`
    pub state: Option<String>,
}

impl ButtonEvent {
    pub fn new(button: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            button: Some(button.into()),
            state: Some(state.into()),
        }
    }
}

/// Key on a Beoremote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeoRemoteButton {
    /// Remote submenu, e.g. `"Control"`
    pub submenu: Option<String>,
    /// Key id, or a full `submenu/key` path when `submenu` is absent
    pub key: Option<String>,
    /// `"KeyPress"` or `"KeyRelease"`
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

impl BeoRemoteButton {
    pub fn new(key: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            submenu: None,
            key: Some(key.into()),
            event_type: Some(event_type.into()),
        }
    }

    pub fn with_submenu(mut self, submenu: impl Into<String>) -> Self {
        self.submenu = Some(submenu.into());
        self
    }
}

/// Sub-type tag of a generic notification, e.g. `"beolinkPeers"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTag {
    pub value: Option<String>,
}

impl NotificationTag {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}
