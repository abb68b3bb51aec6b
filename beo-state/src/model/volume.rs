//! Volume model

use beo_stream::VolumeState;
use serde::{Deserialize, Serialize};

/// Volume level and mute; `None` means the device has not said
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Volume {
    /// Level in 0-100
    pub level: Option<u8>,
    pub muted: Option<bool>,
}

impl Volume {
    pub const MAX_LEVEL: u8 = 100;

    /// Level scaled to 0.0-1.0
    pub fn fraction(&self) -> Option<f32> {
        self.level
            .map(|level| f32::from(level) / f32::from(Self::MAX_LEVEL))
    }
}

impl From<&VolumeState> for Volume {
    fn from(state: &VolumeState) -> Self {
        let level = state
            .level
            .as_ref()
            .and_then(|level| level.level)
            .map(|level| level.clamp(0, i64::from(Self::MAX_LEVEL)) as u8);
        let muted = state.muted.as_ref().and_then(|muted| muted.muted);
        Self { level, muted }
    }
}
