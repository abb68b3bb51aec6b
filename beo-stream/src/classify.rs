//! Notification classifier - maps a Notification to a topic and payload
//!
//! Most kinds map one-to-one onto a topic. Buttons and remote keys are keyed
//! by an id from the payload and carry a translated [`KeyEvent`]. The generic
//! tagged kind is demultiplexed on its sub-type, and several sub-types
//! collapse onto one payload-less topic.

use crate::error::{Result, StreamError};
use crate::key_event::KeyEvent;
use crate::notification::{BeoRemoteButton, ButtonEvent, Notification, NotificationTag};
use crate::topic::{Payload, Topic};

/// A classified notification, ready to publish
#[derive(Debug, Clone, PartialEq)]
pub struct Routed {
    pub topic: Topic,
    pub payload: Payload,
}

impl Routed {
    fn new(topic: Topic, payload: Payload) -> Self {
        Self { topic, payload }
    }

    fn signal(topic: Topic) -> Self {
        Self {
            topic,
            payload: Payload::Empty,
        }
    }
}

/// Tagged sub-types that all mean "Beolink membership changed"
const BEOLINK_TAGS: &[&str] = &["beolinkPeers", "beolinkListeners", "beolinkAvailableListeners"];
const CONFIGURATION_TAG: &str = "configuration";
const REMOTE_MENU_CHANGED_TAG: &str = "remoteMenuChanged";

/// Classify a notification
///
/// Returns `Ok(None)` for tagged sub-types this client does not know about;
/// newer firmware emits those and they are not an error.
pub fn classify(notification: &Notification) -> Result<Option<Routed>> {
    let routed = match notification {
        Notification::PlaybackState(data) => {
            Routed::new(Topic::PlaybackState, Payload::PlaybackState(data.clone()))
        }
        Notification::PlaybackProgress(data) => Routed::new(
            Topic::PlaybackProgress,
            Payload::PlaybackProgress(data.clone()),
        ),
        Notification::PlaybackMetadata(data) => Routed::new(
            Topic::PlaybackMetadata,
            Payload::PlaybackMetadata(data.clone()),
        ),
        Notification::PlaybackSource(data) => {
            Routed::new(Topic::PlaybackSource, Payload::PlaybackSource(data.clone()))
        }
        Notification::SourceChange(data) => {
            required("source_change", "id", data.id.as_deref())?;
            Routed::new(Topic::SourceChange, Payload::SourceChange(data.clone()))
        }
        Notification::Volume(data) => Routed::new(Topic::Volume, Payload::Volume(data.clone())),
        Notification::SoftwareUpdate(data) => {
            Routed::new(Topic::SoftwareUpdate, Payload::SoftwareUpdate(data.clone()))
        }
        Notification::ActiveListeningMode(data) => Routed::new(
            Topic::ActiveListeningMode,
            Payload::ActiveListeningMode(data.clone()),
        ),
        Notification::PlaybackError(data) => {
            Routed::new(Topic::PlaybackError, Payload::PlaybackError(data.clone()))
        }
        Notification::Button(data) => classify_button(data)?,
        Notification::RemoteKey(data) => classify_remote_key(data)?,
        Notification::Tagged(tag) => return classify_tag(tag),
    };

    Ok(Some(routed))
}

fn classify_button(event: &ButtonEvent) -> Result<Routed> {
    const KIND: &str = "button";

    let button = required(KIND, "button", event.button.as_deref())?;
    let state = required(KIND, "state", event.state.as_deref())?;

    let key_event =
        KeyEvent::from_button_state(state).ok_or_else(|| StreamError::UnknownKeyState {
            kind: KIND,
            state: state.to_string(),
        })?;

    Ok(Routed::new(Topic::button(button), Payload::Key(key_event)))
}

fn classify_remote_key(event: &BeoRemoteButton) -> Result<Routed> {
    const KIND: &str = "beo_remote_button";

    let key = required(KIND, "key", event.key.as_deref())?;
    let event_type = required(KIND, "type", event.event_type.as_deref())?;

    let path = match event.submenu.as_deref().filter(|s| !s.is_empty()) {
        Some(submenu) => format!("{}/{}", submenu, key),
        None => key.to_string(),
    };

    let key_event =
        KeyEvent::from_remote_key_type(event_type).ok_or_else(|| StreamError::UnknownKeyState {
            kind: KIND,
            state: event_type.to_string(),
        })?;

    Ok(Routed::new(Topic::RemoteKey(path), Payload::Key(key_event)))
}

fn classify_tag(tag: &NotificationTag) -> Result<Option<Routed>> {
    let value = required("notification", "value", tag.value.as_deref())?;

    let topic = if BEOLINK_TAGS.contains(&value) {
        Topic::Beolink
    } else if value == CONFIGURATION_TAG {
        Topic::Configuration
    } else if value == REMOTE_MENU_CHANGED_TAG {
        Topic::RemoteMenuChanged
    } else {
        return Ok(None);
    };

    Ok(Some(Routed::signal(topic)))
}

fn required<'a>(kind: &'static str, field: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StreamError::missing(kind, field)),
    }
}
