//! Configuration types for a device session

use beo_state::KnownSources;
use beo_stream::DeviceId;

use crate::error::{EventManagerError, Result};
use crate::sources::AudioSource;

/// Version of the device API model this client was built against
///
/// Reported in the warning logged when the device's source enumeration cannot
/// be decoded.
pub const DEFAULT_API_VERSION: &str = "3.4.1.8";

/// Where raw notifications are copied for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticMode {
    /// Not recorded
    Disabled,
    /// Logged as JSON at debug level
    Tracing,
    /// Republished on a broadcast channel
    #[default]
    Broadcast,
}

/// Configuration for a [`DeviceSession`](crate::DeviceSession)
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Device this session talks to
    pub device_id: DeviceId,

    /// Source ids and names the state heuristics rely on
    pub known_sources: KnownSources,

    /// Diagnostic sink selection
    /// Default: Broadcast
    pub diagnostics: DiagnosticMode,

    /// Capacity of the diagnostic broadcast channel
    /// Default: 256
    pub diagnostic_buffer_size: usize,

    /// Capacity of the playback error channel
    /// Default: 16
    pub error_buffer_size: usize,

    /// Source list assembly rules
    pub source_list: SourceListOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_id: DeviceId::new(""),
            known_sources: KnownSources::default(),
            diagnostics: DiagnosticMode::default(),
            diagnostic_buffer_size: 256,
            error_buffer_size: beo_state::DEFAULT_ERROR_CAPACITY,
            source_list: SourceListOptions::default(),
        }
    }
}

impl SessionConfig {
    /// Default configuration for a device
    pub fn new(device_id: impl Into<DeviceId>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Default::default()
        }
    }

    /// Configuration that records nothing and keeps small buffers
    pub fn quiet(device_id: impl Into<DeviceId>) -> Self {
        Self {
            diagnostics: DiagnosticMode::Disabled,
            diagnostic_buffer_size: 1,
            error_buffer_size: 4,
            ..Self::new(device_id)
        }
    }

    pub fn with_known_sources(mut self, known_sources: KnownSources) -> Self {
        self.known_sources = known_sources;
        self
    }

    pub fn with_diagnostics(mut self, mode: DiagnosticMode) -> Self {
        self.diagnostics = mode;
        self
    }

    pub fn with_source_list(mut self, options: SourceListOptions) -> Self {
        self.source_list = options;
        self
    }

    /// Validate the configuration and return the first issue found
    pub fn validate(&self) -> Result<()> {
        if self.device_id.is_empty() {
            return Err(EventManagerError::Configuration(
                "Device id must not be empty".to_string(),
            ));
        }

        if let Some(source) = self.known_sources.iter().find(|s| s.id.trim().is_empty()) {
            return Err(EventManagerError::Configuration(format!(
                "Known source {:?} has an empty id",
                source.name
            )));
        }

        if self.diagnostic_buffer_size == 0 {
            return Err(EventManagerError::Configuration(
                "Diagnostic buffer size must be greater than 0".to_string(),
            ));
        }

        if self.error_buffer_size == 0 {
            return Err(EventManagerError::Configuration(
                "Error buffer size must be greater than 0".to_string(),
            ));
        }

        self.source_list.validate()
    }
}

/// Rules for assembling the user-selectable source list
#[derive(Debug, Clone)]
pub struct SourceListOptions {
    /// Audio source ids never offered to the user
    pub hidden_source_ids: Vec<String>,

    /// Menu label of the built-in TV entry, which is not a source
    /// Default: "TV"
    pub reserved_video_label: String,

    /// Menu category that marks an entry as audio
    /// Default: "music"
    pub excluded_video_category: String,

    /// Audio sources used when the device's own list cannot be read
    pub fallback_sources: Vec<AudioSource>,

    /// Client API version, reported when falling back
    pub api_version: String,
}

impl Default for SourceListOptions {
    fn default() -> Self {
        Self {
            hidden_source_ids: [
                "airPlay",
                "bluetooth",
                "chromeCast",
                "generator",
                "local",
                "dlna",
                "qplay",
                "wpl",
                "pl",
                "beolink",
                "usbIn",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            reserved_video_label: "TV".to_string(),
            excluded_video_category: "music".to_string(),
            fallback_sources: default_fallback_sources(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl SourceListOptions {
    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden_source_ids.iter().any(|hidden| hidden == id)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reserved_video_label.is_empty() {
            return Err(EventManagerError::Configuration(
                "Reserved video label must not be empty".to_string(),
            ));
        }

        if self.excluded_video_category.is_empty() {
            return Err(EventManagerError::Configuration(
                "Excluded video category must not be empty".to_string(),
            ));
        }

        if self.fallback_sources.is_empty() {
            return Err(EventManagerError::Configuration(
                "Fallback source table must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_fallback_sources() -> Vec<AudioSource> {
    [
        ("uriStreamer", "Audio Streamer", false),
        ("bluetooth", "Bluetooth", false),
        ("spotify", "Spotify Connect", true),
        ("lineIn", "Line-In", true),
        ("spdif", "Optical", true),
        ("netRadio", "B&O Radio", true),
        ("deezer", "Deezer", true),
        ("tidalConnect", "Tidal Connect", true),
    ]
    .into_iter()
    .map(|(id, name, multiroom)| AudioSource::new(id, name).with_multiroom(multiroom))
    .collect()
}
