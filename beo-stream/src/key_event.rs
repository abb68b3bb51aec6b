//! Logical key events
//!
//! Buttons and Beoremote keys report raw device key states. Subscribers of the
//! `Button:<id>` and `RemoteKey:<path>` topics receive these translated events
//! instead of the raw payload.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical key event delivered on button and remote-key topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEvent {
    /// Remote key went down
    Press,
    /// Remote key went up
    Release,
    /// Device button released after a short press
    ShortPress,
    /// Device button held past the long-press timeout
    LongPress,
    /// Device button released after a long press
    LongPressRelease,
    /// Device button held past the very-long-press timeout
    VeryLongPress,
    /// Device button released after a very long press
    VeryLongPressRelease,
}

/// Device button states and their logical events
const BUTTON_STATES: &[(&str, KeyEvent)] = &[
    ("shortPress (Release)", KeyEvent::ShortPress),
    ("longPress (Timeout)", KeyEvent::LongPress),
    ("longPress (Release)", KeyEvent::LongPressRelease),
    ("veryLongPress (Timeout)", KeyEvent::VeryLongPress),
    ("veryLongPress (Release)", KeyEvent::VeryLongPressRelease),
];

/// Beoremote key event types and their logical events
const REMOTE_KEY_TYPES: &[(&str, KeyEvent)] = &[
    ("KeyPress", KeyEvent::Press),
    ("KeyRelease", KeyEvent::Release),
];

impl KeyEvent {
    /// Translate a device button state
    pub fn from_button_state(state: &str) -> Option<Self> {
        lookup(BUTTON_STATES, state)
    }

    /// Translate a Beoremote key event type
    pub fn from_remote_key_type(event_type: &str) -> Option<Self> {
        lookup(REMOTE_KEY_TYPES, event_type)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyEvent::Press => "press",
            KeyEvent::Release => "release",
            KeyEvent::ShortPress => "short_press",
            KeyEvent::LongPress => "long_press",
            KeyEvent::LongPressRelease => "long_press_release",
            KeyEvent::VeryLongPress => "very_long_press",
            KeyEvent::VeryLongPressRelease => "very_long_press_release",
        }
    }

    /// Whether this event ends a key interaction
    pub fn is_release(&self) -> bool {
        matches!(
            self,
            KeyEvent::Release
                | KeyEvent::ShortPress
                | KeyEvent::LongPressRelease
                | KeyEvent::VeryLongPressRelease
        )
    }
}

fn lookup(table: &[(&str, KeyEvent)], raw: &str) -> Option<KeyEvent> {
    table
        .iter()
        .find(|(name, _)| *name == raw)
        .map(|(_, event)| *event)
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
