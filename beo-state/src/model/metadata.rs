//! Playback metadata and artwork selection

use beo_stream::{Art, BeolinkLeader, PlaybackContentMetadata};

/// Metadata of the content currently playing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    pub title: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
    pub track: Option<u32>,
    pub duration_secs: Option<u64>,
    /// `Some(vec![])` when the device sent an empty art list
    pub art: Option<Vec<Art>>,
    /// Organisation or radio channel
    pub organization: Option<String>,
    pub remote_leader: Option<BeolinkLeader>,
}

impl Metadata {
    /// Title, if present and non-empty
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.is_empty())
    }

    /// Whether the device sent an explicitly empty art list
    pub fn has_empty_art(&self) -> bool {
        matches!(&self.art, Some(art) if art.is_empty())
    }

    /// Highest-resolution artwork entry
    pub fn best_artwork(&self) -> Option<Art> {
        let art = self.art.as_ref()?;
        let mut best: Option<(&Art, Resolution)> = None;
        for entry in art {
            let resolution = Resolution::of(entry);
            // Ties keep the first entry
            if best.map_or(true, |(_, current)| resolution > current) {
                best = Some((entry, resolution));
            }
        }
        best.map(|(entry, _)| entry.clone())
    }
}

impl From<&PlaybackContentMetadata> for Metadata {
    fn from(raw: &PlaybackContentMetadata) -> Self {
        Self {
            title: raw.title.clone(),
            album: raw.album_name.clone(),
            artist: raw.artist_name.clone(),
            track: raw.track.map(clamp_track),
            duration_secs: raw
                .total_duration_seconds
                .map(|secs| secs.max(0).unsigned_abs()),
            art: raw.art.clone(),
            organization: raw.organization.clone(),
            remote_leader: raw.remote_leader.clone(),
        }
    }
}

/// Negative track numbers become 0, oversized ones saturate
fn clamp_track(track: i64) -> u32 {
    u32::try_from(track.max(0)).unwrap_or(u32::MAX)
}

/// Ordering key for artwork entries
///
/// A pixel width from a `WxH` key outranks a size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Resolution {
    Unknown,
    Class(u8),
    Width(u32),
}

impl Resolution {
    fn of(art: &Art) -> Self {
        if let Some(width) = art.key.as_deref().and_then(parse_width) {
            return Resolution::Width(width);
        }
        match art.size.as_deref() {
            Some("small") => Resolution::Class(1),
            Some("medium") => Resolution::Class(2),
            Some("large") => Resolution::Class(3),
            _ => Resolution::Unknown,
        }
    }
}

fn parse_width(key: &str) -> Option<u32> {
    let (width, height) = key.split_once('x')?;
    height.trim().parse::<u32>().ok()?;
    width.trim().parse().ok()
}
