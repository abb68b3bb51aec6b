//! Device identity type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a Bang & Olufsen device
///
/// Usually the serial number that also appears in the device's Beolink JID.
/// Surrounding whitespace is trimmed so ids read from configuration and from
/// the device compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a new DeviceId, normalizing the format
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self(id.trim().to_string())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty after normalization
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        DeviceId::new(s)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        DeviceId::new(s)
    }
}
