//! Sources and the well-known source table

use beo_stream::Source;
use serde::{Deserialize, Serialize};

/// Source id and name as last reported or derived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: String,
    pub name: Option<String>,
    pub is_seekable: bool,
}

impl SourceRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            is_seekable: false,
        }
    }

    /// Convert a reported source; `None` when it carries no id
    pub fn from_source(source: &Source) -> Option<Self> {
        let id = source.id.as_deref().filter(|id| !id.is_empty())?;
        Some(Self {
            id: id.to_string(),
            name: source.name.clone(),
            is_seekable: source.is_seekable.unwrap_or(false),
        })
    }

    /// Name if known, else the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A source with a fixed id and the friendly name the device uses for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownSource {
    pub id: String,
    pub name: String,
}

impl KnownSource {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn matches(&self, source: &SourceRef) -> bool {
        self.id == source.id
    }

    pub fn to_source_ref(&self) -> SourceRef {
        SourceRef::new(self.id.clone(), self.name.clone())
    }
}

/// Ids and friendly names the state heuristics rely on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownSources {
    pub line_in: KnownSource,
    /// Wireless (Bluetooth) input
    pub bluetooth: KnownSource,
    /// Optical (S/PDIF) input
    pub optical: KnownSource,
    /// Generic casting source
    pub cast: KnownSource,
    pub uri_streamer: KnownSource,
}

impl Default for KnownSources {
    fn default() -> Self {
        Self {
            line_in: KnownSource::new("lineIn", "Line-In"),
            bluetooth: KnownSource::new("bluetooth", "Bluetooth"),
            optical: KnownSource::new("spdif", "Optical"),
            cast: KnownSource::new("chromeCast", "Chromecast built-in"),
            uri_streamer: KnownSource::new("uriStreamer", "Audio Streamer"),
        }
    }
}

impl KnownSources {
    pub fn iter(&self) -> impl Iterator<Item = &KnownSource> {
        [
            &self.line_in,
            &self.bluetooth,
            &self.optical,
            &self.cast,
            &self.uri_streamer,
        ]
        .into_iter()
    }

    /// Physical inputs whose position restarts when selected
    pub fn resets_progress(&self, source: &SourceRef) -> bool {
        self.line_in.matches(source) || self.optical.matches(source)
    }

    /// Inputs that never carry their own metadata
    pub fn is_local_input(&self, source: &SourceRef) -> bool {
        self.bluetooth.matches(source) || self.line_in.matches(source) || self.optical.matches(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_source_requires_id() {
        assert_eq!(SourceRef::from_source(&Source::default()), None);

        let mut source = Source::new("tidal", "TIDAL");
        source.is_seekable = Some(true);
        let source = SourceRef::from_source(&source).unwrap();
        assert_eq!(source.id, "tidal");
        assert!(source.is_seekable);
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let source = SourceRef {
            id: "netRadio".to_string(),
            name: None,
            is_seekable: false,
        };
        assert_eq!(source.display_name(), "netRadio");
    }

    #[test]
    fn test_default_known_sources() {
        let known = KnownSources::default();
        assert_eq!(known.iter().count(), 5);
        assert!(known.resets_progress(&SourceRef::new("spdif", "Optical")));
        assert!(!known.resets_progress(&SourceRef::new("bluetooth", "Bluetooth")));
        assert!(known.is_local_input(&SourceRef::new("bluetooth", "Bluetooth")));
        assert!(!known.is_local_input(&SourceRef::new("chromeCast", "Chromecast built-in")));
    }
}
