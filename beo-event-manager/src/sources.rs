//! Source list assembly
//!
//! The user-selectable source list combines the device's audio sources with
//! the video sources found in its remote menu. It is rebuilt whenever the
//! device signals that either may have changed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use beo_stream::{NotificationRouter, Subscription, Topic};

use crate::config::SourceListOptions;
use crate::error::{ApiError, Result};

/// Audio source as enumerated by the device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSource {
    pub id: Option<String>,
    pub name: Option<String>,
    pub is_enabled: Option<bool>,
    pub is_playable: Option<bool>,
    /// Whether other devices can join this source over Beolink
    pub is_multiroom_available: Option<bool>,
}

impl AudioSource {
    /// An enabled, playable source
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            is_enabled: Some(true),
            is_playable: Some(true),
            is_multiroom_available: None,
        }
    }

    pub fn with_multiroom(mut self, available: bool) -> Self {
        self.is_multiroom_available = Some(available);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.is_enabled = Some(false);
        self
    }
}

/// Content descriptor of a remote menu entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuContent {
    pub categories: Option<Vec<String>>,
}

/// Entry of the device's remote menu
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub label: Option<String>,
    pub available: Option<bool>,
    pub content: Option<MenuContent>,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, categories: &[&str]) -> Self {
        Self {
            label: Some(label.into()),
            available: Some(true),
            content: Some(MenuContent {
                categories: Some(categories.iter().map(|c| c.to_string()).collect()),
            }),
        }
    }
}

/// Device API calls needed to enumerate sources
#[async_trait]
pub trait SourceApi: Send + Sync {
    /// Audio sources, in device order
    async fn available_sources(&self) -> std::result::Result<Vec<AudioSource>, ApiError>;

    /// Remote menu entries keyed by menu id, in device order
    async fn remote_menu(&self) -> std::result::Result<Vec<(String, MenuItem)>, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Audio,
    Video,
}

/// One selectable source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub id: String,
    pub name: String,
    pub kind: SourceKind,
}

/// Assembled source list: audio sources first, then video sources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    entries: Vec<SourceEntry>,
    beolink_expandable: HashMap<String, bool>,
    used_fallback: bool,
}

impl SourceList {
    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a source by its display name
    pub fn find_by_name(&self, name: &str) -> Option<&SourceEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Whether an audio source can be expanded to other devices over Beolink
    ///
    /// `None` for ids the device did not enumerate.
    pub fn is_beolink_expandable(&self, id: &str) -> Option<bool> {
        self.beolink_expandable.get(id).copied()
    }

    /// Whether the fallback table replaced the device's audio sources
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    fn push(&mut self, id: String, name: String, kind: SourceKind) {
        if self.entries.iter().any(|e| e.id == id) {
            return;
        }
        self.entries.push(SourceEntry { id, name, kind });
    }
}

/// Build the source list from the device
///
/// A version mismatch while enumerating audio sources falls back to the
/// configured table; any other failure is returned.
pub async fn assemble_source_list(
    api: &dyn SourceApi,
    options: &SourceListOptions,
) -> Result<SourceList> {
    let mut list = SourceList::default();

    let audio = match api.available_sources().await {
        Ok(sources) => sources,
        Err(ApiError::VersionMismatch(detail)) => {
            tracing::warn!(
                "The API is outdated compared to the device software ({}, client API {}). Using fallback sources",
                detail,
                options.api_version
            );
            list.used_fallback = true;
            options.fallback_sources.clone()
        }
        Err(e) => return Err(e.into()),
    };

    for source in &audio {
        let Some(id) = source.id.as_deref().filter(|id| !id.is_empty()) else {
            continue;
        };
        list.beolink_expandable
            .insert(id.to_string(), source.is_multiroom_available.unwrap_or(false));

        let enabled = source.is_enabled.unwrap_or(false);
        match source.name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) if enabled && !options.is_hidden(id) => {
                list.push(id.to_string(), name.to_string(), SourceKind::Audio);
            }
            _ => {}
        }
    }

    for (key, item) in api.remote_menu().await? {
        if let Some(label) = video_label(&item, options) {
            list.push(key, label.to_string(), SourceKind::Video);
        }
    }

    tracing::debug!(
        sources = list.len(),
        fallback = list.used_fallback,
        "Assembled source list"
    );

    Ok(list)
}

fn video_label<'a>(item: &'a MenuItem, options: &SourceListOptions) -> Option<&'a str> {
    if !item.available.unwrap_or(false) {
        return None;
    }

    let label = item.label.as_deref().filter(|label| !label.is_empty())?;
    if label == options.reserved_video_label {
        return None;
    }

    let categories = item.content.as_ref()?.categories.as_ref()?;
    if categories.is_empty() || categories.contains(&options.excluded_video_category) {
        return None;
    }

    Some(label)
}

/// Keeps an assembled source list current
///
/// Rebuilds the list on `RemoteMenuChanged` and `PlaybackSource`. The router
/// handlers only queue a refresh; the device calls run on a spawned task.
pub struct SourceListWatcher {
    latest: watch::Receiver<Option<SourceList>>,
    refresh_tx: mpsc::UnboundedSender<()>,
    subscriptions: Vec<Subscription>,
    task: JoinHandle<()>,
}

impl SourceListWatcher {
    /// Start watching; must be called inside a tokio runtime
    ///
    /// An initial assembly is queued immediately.
    pub fn spawn(
        router: &NotificationRouter,
        api: Arc<dyn SourceApi>,
        options: SourceListOptions,
    ) -> Self {
        let (latest_tx, latest) = watch::channel(None);
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();

        let subscriptions: Vec<Subscription> = [Topic::RemoteMenuChanged, Topic::PlaybackSource]
            .into_iter()
            .map(|topic| {
                let tx = refresh_tx.clone();
                router.subscribe(topic, move |_| {
                    let _ = tx.send(());
                })
            })
            .collect();

        let device_id = router.device_id().clone();
        let task = tokio::spawn(async move {
            run_refresh_loop(api, options, refresh_rx, latest_tx).await;
            tracing::debug!(device_id = %device_id, "Source list watcher stopped");
        });

        let watcher = Self {
            latest,
            refresh_tx,
            subscriptions,
            task,
        };
        watcher.refresh();
        watcher
    }

    /// Queue a rebuild
    pub fn refresh(&self) {
        let _ = self.refresh_tx.send(());
    }

    /// Most recently assembled list
    pub fn latest(&self) -> Option<SourceList> {
        self.latest.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Option<SourceList>> {
        self.latest.clone()
    }

    /// Detach from the router and stop the refresh task
    ///
    /// Dropping the watcher does the same.
    pub fn shutdown(self) {}
}

impl Drop for SourceListWatcher {
    fn drop(&mut self) {
        for subscription in std::mem::take(&mut self.subscriptions) {
            subscription.unsubscribe();
        }
        self.task.abort();
    }
}

async fn run_refresh_loop(
    api: Arc<dyn SourceApi>,
    options: SourceListOptions,
    mut refresh_rx: mpsc::UnboundedReceiver<()>,
    latest_tx: watch::Sender<Option<SourceList>>,
) {
    while refresh_rx.recv().await.is_some() {
        // Coalesce a burst of change signals into one rebuild
        while refresh_rx.try_recv().is_ok() {}

        match assemble_source_list(api.as_ref(), &options).await {
            Ok(list) => {
                latest_tx.send_replace(Some(list));
            }
            Err(e) => {
                tracing::warn!("Failed to refresh source list: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventManagerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeApi {
        audio: std::result::Result<Vec<AudioSource>, ApiError>,
        menu: Vec<(String, MenuItem)>,
        calls: AtomicUsize,
    }

    impl FakeApi {
        fn new(audio: std::result::Result<Vec<AudioSource>, ApiError>) -> Self {
            Self {
                audio,
                menu: Vec::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_menu(mut self, menu: Vec<(&str, MenuItem)>) -> Self {
            self.menu = menu.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
            self
        }
    }

    #[async_trait]
    impl SourceApi for FakeApi {
        async fn available_sources(&self) -> std::result::Result<Vec<AudioSource>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.audio.clone()
        }

        async fn remote_menu(&self) -> std::result::Result<Vec<(String, MenuItem)>, ApiError> {
            Ok(self.menu.clone())
        }
    }

    #[tokio::test]
    async fn test_audio_filter() {
        let api = FakeApi::new(Ok(vec![
            AudioSource::new("spotify", "Spotify Connect").with_multiroom(true),
            AudioSource::new("airPlay", "AirPlay"),
            AudioSource::new("deezer", "Deezer").disabled(),
            AudioSource {
                id: Some("tidal".to_string()),
                name: None,
                is_enabled: Some(true),
                ..AudioSource::default()
            },
            AudioSource::new("lineIn", "Line-In"),
        ]));

        let list = assemble_source_list(&api, &SourceListOptions::default())
            .await
            .unwrap();

        assert_eq!(list.names(), vec!["Spotify Connect", "Line-In"]);
        assert!(!list.used_fallback());
        assert_eq!(list.is_beolink_expandable("spotify"), Some(true));
        assert_eq!(list.is_beolink_expandable("lineIn"), Some(false));
        assert_eq!(list.is_beolink_expandable("unknown"), None);
    }

    #[tokio::test]
    async fn test_video_filter_and_order() {
        let mut unavailable = MenuItem::new("HDMI 2", &["tv"]);
        unavailable.available = Some(false);
        let uncategorised = MenuItem {
            label: Some("Apple TV".to_string()),
            available: Some(true),
            content: None,
        };

        let api = FakeApi::new(Ok(vec![AudioSource::new("spotify", "Spotify Connect")]))
            .with_menu(vec![
                ("tv", MenuItem::new("TV", &["tv"])),
                ("hdmi1", MenuItem::new("HDMI 1", &["tv"])),
                ("hdmi2", unavailable),
                ("radio", MenuItem::new("Radio", &["music"])),
                ("empty", MenuItem::new("Empty", &[])),
                ("appletv", uncategorised),
                ("console", MenuItem::new("Console", &["game", "tv"])),
            ]);

        let list = assemble_source_list(&api, &SourceListOptions::default())
            .await
            .unwrap();

        assert_eq!(list.names(), vec!["Spotify Connect", "HDMI 1", "Console"]);
        assert_eq!(list.entries()[1].kind, SourceKind::Video);
        assert_eq!(list.find_by_name("Console").unwrap().id, "console");
    }

    #[tokio::test]
    async fn test_version_mismatch_uses_fallback() {
        let api = FakeApi::new(Err(ApiError::VersionMismatch("4.0.0".to_string())));

        let list = assemble_source_list(&api, &SourceListOptions::default())
            .await
            .unwrap();

        assert!(list.used_fallback());
        // Hidden ids are filtered from the fallback table too
        assert!(list.find_by_name("Bluetooth").is_none());
        assert!(list.find_by_name("Spotify Connect").is_some());
        assert_eq!(list.is_beolink_expandable("uriStreamer"), Some(false));
    }

    #[tokio::test]
    async fn test_other_errors_propagate() {
        let api = FakeApi::new(Err(ApiError::Request("timeout".to_string())));

        let err = assemble_source_list(&api, &SourceListOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, EventManagerError::Api(ApiError::Request(_))));
    }
}
