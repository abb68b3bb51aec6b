//! Playback progress

use chrono::{DateTime, Utc};

/// Elapsed playback time and when it was last updated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    elapsed_secs: u64,
    updated_at: Option<DateTime<Utc>>,
}

impl Progress {
    /// Progress as reported by the device; negative and absent values read as 0
    pub fn reported(raw: Option<i64>, now: DateTime<Utc>) -> Self {
        let elapsed_secs = raw.map(|secs| secs.max(0).unsigned_abs()).unwrap_or(0);
        Self {
            elapsed_secs,
            updated_at: Some(now),
        }
    }

    /// Progress reset to the start
    pub fn reset(now: DateTime<Utc>) -> Self {
        Self {
            elapsed_secs: 0,
            updated_at: Some(now),
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// When the position was last written; `None` before the first report
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}
