//! State reconciler
//!
//! Subscribes to the state-bearing topics of a [`NotificationRouter`] and
//! merges each payload into one [`DeviceState`].
//!
//! # Architecture
//!
//! ```text
//! NotificationRouter ──► StateReconciler::apply ──► watch::Sender<DeviceState>
//!                                 │                        │
//!                                 │                        └─► snapshot() / watch()
//!                                 └─► broadcast::Sender<StateError> ──► errors()
//! ```
//!
//! `apply` runs on the router's dispatch sequence, so the state has a single
//! writer. Readers never block it.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, watch};

use beo_stream::{DeviceId, NotificationRouter, Payload, Subscription, Topic};

use crate::device_state::DeviceState;
use crate::error::StateError;
use crate::model::{KnownSources, ListeningMode, Metadata, PlaybackState, Progress, SourceRef, Volume};

/// Topics the reconciler merges
pub const RECONCILED_TOPICS: &[Topic] = &[
    Topic::PlaybackState,
    Topic::PlaybackProgress,
    Topic::PlaybackMetadata,
    Topic::SourceChange,
    Topic::Volume,
    Topic::ActiveListeningMode,
    Topic::PlaybackError,
];

/// Default capacity of the playback error channel
pub const DEFAULT_ERROR_CAPACITY: usize = 16;

/// Merges notifications into a [`DeviceState`]
pub struct StateReconciler {
    device_id: DeviceId,
    known_sources: KnownSources,
    state: watch::Sender<DeviceState>,
    errors: broadcast::Sender<StateError>,
}

impl StateReconciler {
    pub fn new(device_id: DeviceId, known_sources: KnownSources, error_capacity: usize) -> Self {
        let (state, _) = watch::channel(DeviceState::default());
        let (errors, _) = broadcast::channel(error_capacity.max(1));
        Self {
            device_id,
            known_sources,
            state,
            errors,
        }
    }

    /// Subscribe the reconciler to every topic it merges
    ///
    /// The returned subscriptions detach it again.
    pub fn attach(self: &Arc<Self>, router: &NotificationRouter) -> Vec<Subscription> {
        RECONCILED_TOPICS
            .iter()
            .map(|topic| {
                let reconciler = Arc::clone(self);
                router.subscribe(topic.clone(), move |payload| reconciler.apply(payload))
            })
            .collect()
    }

    /// Merge one payload
    pub fn apply(&self, payload: &Payload) {
        match payload {
            Payload::PlaybackState(rendering) => {
                let playback_state = PlaybackState::from_device(rendering.value.as_deref());
                self.state.send_modify(|state| state.playback_state = playback_state);
                tracing::debug!(device_id = %self.device_id, ?playback_state, "Playback state merged");
            }
            Payload::PlaybackProgress(progress) => {
                let progress = Progress::reported(progress.progress, Utc::now());
                self.state.send_modify(|state| state.progress = progress);
            }
            Payload::PlaybackMetadata(raw) => {
                let metadata = Metadata::from(raw);
                let artwork = metadata.best_artwork();
                self.state.send_modify(|state| {
                    state.metadata = Some(metadata);
                    state.artwork = artwork;
                });
                tracing::debug!(device_id = %self.device_id, "Metadata merged");
            }
            Payload::SourceChange(raw) => match SourceRef::from_source(raw) {
                Some(source) => self.apply_source_change(source),
                None => {
                    tracing::warn!(device_id = %self.device_id, "Ignoring source change without id");
                }
            },
            Payload::Volume(raw) => {
                let volume = Volume::from(raw);
                self.state.send_modify(|state| state.volume = volume);
                tracing::debug!(device_id = %self.device_id, ?volume, "Volume merged");
            }
            Payload::ActiveListeningMode(raw) => {
                let mode = ListeningMode::from(raw);
                self.state.send_modify(|state| state.listening_mode = Some(mode));
            }
            Payload::PlaybackError(raw) => {
                let message = raw
                    .error
                    .clone()
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| "unknown playback error".to_string());
                self.report_error(StateError::Playback {
                    device_id: self.device_id.clone(),
                    message,
                });
            }
            other => {
                tracing::trace!(device_id = %self.device_id, ?other, "Payload not reconciled");
            }
        }
    }

    fn apply_source_change(&self, source: SourceRef) {
        // Line-in and optical do not report progress; the last value belongs
        // to the previous source
        let reset = self.known_sources.resets_progress(&source);

        tracing::debug!(
            device_id = %self.device_id,
            source = %source.id,
            reset_progress = reset,
            "Source merged"
        );

        self.state.send_modify(|state| {
            state.source = Some(source);
            if reset {
                state.progress = Progress::reset(Utc::now());
            }
        });
    }

    fn report_error(&self, error: StateError) {
        tracing::error!(device_id = %self.device_id, "{}", error);
        // No receivers is not an error
        let _ = self.errors.send(error);
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn known_sources(&self) -> &KnownSources {
        &self.known_sources
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> DeviceState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every merge
    pub fn watch(&self) -> watch::Receiver<DeviceState> {
        self.state.subscribe()
    }

    /// Source to display, see [`DeviceState::display_source`]
    pub fn displayed_source(&self) -> Option<SourceRef> {
        self.state.borrow().display_source(&self.known_sources)
    }

    /// Playback errors reported after this call
    pub fn errors(&self) -> broadcast::Receiver<StateError> {
        self.errors.subscribe()
    }
}

impl std::fmt::Debug for StateReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateReconciler")
            .field("device_id", &self.device_id)
            .field("state", &*self.state.borrow())
            .finish()
    }
}
