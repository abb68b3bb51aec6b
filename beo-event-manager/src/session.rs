//! Per-device session wiring
//!
//! A [`DeviceSession`] owns the router, connection supervisor and state
//! reconciler of one device and connects them:
//!
//! ```text
//! link ──► LinkWorker ──┬─► ConnectionSupervisor ──► Topic::ConnectionStatus
//!                       └─► NotificationRouter ──┬─► StateReconciler
//!                                                ├─► SourceListWatcher (optional)
//!                                                ├─► SoftwareUpdateWatcher (optional)
//!                                                └─► application subscribers
//! ```

use std::sync::Arc;

use futures::Stream;
use tokio::sync::broadcast;

use beo_state::{DeviceState, SourceRef, StateError, StateReconciler};
use beo_stream::{
    BroadcastSink, DiagnosticEvent, DiagnosticSink, NoopSink, NotificationRouter, Payload,
    Subscription, Topic, TracingSink,
};

use crate::config::{DiagnosticMode, SessionConfig};
use crate::error::Result;
use crate::software_update::{DeviceRegistry, SoftwareUpdateWatcher, SoftwareVersionSource};
use crate::sources::{SourceApi, SourceListWatcher};
use crate::supervisor::ConnectionSupervisor;
use crate::worker::{LinkEvent, LinkWorker};

/// Router, supervisor and reconciler for one device
pub struct DeviceSession {
    config: SessionConfig,
    router: NotificationRouter,
    supervisor: Arc<ConnectionSupervisor>,
    reconciler: Arc<StateReconciler>,
    diagnostics: Option<BroadcastSink>,
    reconciler_subscriptions: Vec<Subscription>,
}

impl DeviceSession {
    /// Validate the configuration and wire a new session
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;

        let diagnostics = match config.diagnostics {
            DiagnosticMode::Broadcast => Some(BroadcastSink::new(config.diagnostic_buffer_size)),
            DiagnosticMode::Disabled | DiagnosticMode::Tracing => None,
        };
        let sink: Arc<dyn DiagnosticSink> = match (&diagnostics, config.diagnostics) {
            (Some(broadcast), _) => Arc::new(broadcast.clone()),
            (None, DiagnosticMode::Tracing) => Arc::new(TracingSink),
            (None, _) => Arc::new(NoopSink),
        };

        let router = NotificationRouter::with_diagnostics(config.device_id.clone(), sink);
        let supervisor = Arc::new(ConnectionSupervisor::new(router.clone()));
        let reconciler = Arc::new(StateReconciler::new(
            config.device_id.clone(),
            config.known_sources.clone(),
            config.error_buffer_size,
        ));
        let reconciler_subscriptions = reconciler.attach(&router);

        tracing::debug!(device_id = %config.device_id, "Device session created");

        Ok(Self {
            config,
            router,
            supervisor,
            reconciler,
            diagnostics,
            reconciler_subscriptions,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn router(&self) -> &NotificationRouter {
        &self.router
    }

    pub fn supervisor(&self) -> &Arc<ConnectionSupervisor> {
        &self.supervisor
    }

    pub fn reconciler(&self) -> &Arc<StateReconciler> {
        &self.reconciler
    }

    /// Subscribe to a topic on this device
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        self.router.subscribe(topic, handler)
    }

    pub fn is_connected(&self) -> bool {
        self.supervisor.is_connected()
    }

    pub fn snapshot(&self) -> DeviceState {
        self.reconciler.snapshot()
    }

    pub fn displayed_source(&self) -> Option<SourceRef> {
        self.reconciler.displayed_source()
    }

    pub fn errors(&self) -> broadcast::Receiver<StateError> {
        self.reconciler.errors()
    }

    /// Raw notification feed; `None` unless diagnostics are broadcast
    pub fn diagnostics(&self) -> Option<broadcast::Receiver<DiagnosticEvent>> {
        self.diagnostics.as_ref().map(BroadcastSink::subscribe)
    }

    /// Start draining a link stream into this session
    pub fn spawn_link<S>(&self, link: S) -> LinkWorker
    where
        S: Stream<Item = LinkEvent> + Send + 'static,
    {
        LinkWorker::spawn(link, Arc::clone(&self.supervisor), self.router.clone())
    }

    /// Keep the source list current using `api`
    pub fn watch_sources(&self, api: Arc<dyn SourceApi>) -> SourceListWatcher {
        SourceListWatcher::spawn(&self.router, api, self.config.source_list.clone())
    }

    /// Forward software version changes to `registry`
    pub fn watch_software_updates(
        &self,
        source: Arc<dyn SoftwareVersionSource>,
        registry: Arc<dyn DeviceRegistry>,
        recorded_version: Option<String>,
    ) -> SoftwareUpdateWatcher {
        SoftwareUpdateWatcher::spawn(&self.router, source, registry, recorded_version)
    }

    /// Stop merging notifications into the state
    ///
    /// The last state stays readable.
    pub fn detach_state(&mut self) {
        for subscription in self.reconciler_subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("device_id", &self.config.device_id)
            .field("connected", &self.is_connected())
            .finish()
    }
}
