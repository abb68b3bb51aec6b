//! Reconciled device state and the derived read accessors
//!
//! `DeviceState` holds what the device last reported, merged. Values that the
//! device reports unreliably (the active source, the Beolink leader, the
//! media position) are derived on read from the merged fields.

use beo_stream::{Art, BeolinkLeader};

use crate::model::{
    KnownSources, ListeningMode, Metadata, PlaybackState, Progress, SourceRef, Volume,
};

/// Kind of media the device is rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Music,
    /// Arbitrary URI handed to the device's streamer
    Url,
}

/// Internally consistent view of one device
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeviceState {
    pub playback_state: PlaybackState,
    /// Last source-change report
    pub source: Option<SourceRef>,
    pub metadata: Option<Metadata>,
    /// Best artwork of `metadata`
    pub artwork: Option<Art>,
    pub progress: Progress,
    pub volume: Volume,
    pub listening_mode: Option<ListeningMode>,
}

impl DeviceState {
    fn title(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(Metadata::title)
    }

    /// Source to display
    ///
    /// Several inputs report a stale or wrong source. Checked in order, first
    /// match wins:
    ///
    /// 1. the title is the line-in name: line-in
    /// 2. the title is the Bluetooth name: Bluetooth
    /// 3. a local input is reported but the metadata has a title of its own:
    ///    the casting source
    /// 4. the casting source is reported with an empty art list: Bluetooth
    /// 5. otherwise the reported source
    ///
    /// Rule 3 needs a non-empty title; a metadata object with no title does
    /// not count as evidence of casting.
    pub fn display_source(&self, known: &KnownSources) -> Option<SourceRef> {
        let title = self.title();

        if title == Some(known.line_in.name.as_str()) {
            return Some(known.line_in.to_source_ref());
        }
        if title == Some(known.bluetooth.name.as_str()) {
            return Some(known.bluetooth.to_source_ref());
        }

        let source = self.source.as_ref()?;

        if known.is_local_input(source) && title.is_some() {
            return Some(known.cast.to_source_ref());
        }

        let empty_art = self
            .metadata
            .as_ref()
            .map(Metadata::has_empty_art)
            .unwrap_or(false);
        if known.cast.matches(source) && empty_art {
            return Some(known.bluetooth.to_source_ref());
        }

        Some(source.clone())
    }

    /// Beolink leader this device is listening to
    ///
    /// Line-in and the URI streamer keep a stale leader in their metadata, so
    /// it is ignored for those sources.
    pub fn remote_leader(&self, known: &KnownSources) -> Option<&BeolinkLeader> {
        if let Some(source) = &self.source {
            if known.line_in.matches(source) || known.uri_streamer.matches(source) {
                return None;
            }
        }
        self.metadata.as_ref()?.remote_leader.as_ref()
    }

    /// Elapsed seconds, unavailable while listening to a Beolink leader
    pub fn media_position(&self, known: &KnownSources) -> Option<u64> {
        if self.remote_leader(known).is_some() {
            return None;
        }
        Some(self.progress.elapsed_secs())
    }

    pub fn media_type(&self, known: &KnownSources) -> MediaType {
        match &self.source {
            Some(source) if known.uri_streamer.matches(source) => MediaType::Url,
            _ => MediaType::Music,
        }
    }

    pub fn is_seekable(&self) -> bool {
        self.source
            .as_ref()
            .map(|source| source.is_seekable)
            .unwrap_or(false)
    }

    /// Volume in 0.0-1.0
    pub fn volume_level(&self) -> Option<f32> {
        self.volume.fraction()
    }

    pub fn is_muted(&self) -> Option<bool> {
        self.volume.muted
    }
}
