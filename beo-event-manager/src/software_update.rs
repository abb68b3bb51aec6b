//! Software update boundary
//!
//! A software-update notification means the device may be running new
//! firmware. The watcher fetches the current version and, only when it differs
//! from the one last recorded, asks the device registry to update its record.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use beo_stream::{DeviceId, NotificationRouter, Payload, Subscription, Topic};

use crate::error::ApiError;

/// Reads the device's software version
#[async_trait]
pub trait SoftwareVersionSource: Send + Sync {
    async fn software_version(&self) -> Result<String, ApiError>;
}

/// Records device information outside this client
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    async fn update_software_version(
        &self,
        device_id: &DeviceId,
        version: &str,
    ) -> Result<(), ApiError>;
}

/// Reacts to software-update notifications
pub struct SoftwareUpdateWatcher {
    recorded: watch::Receiver<Option<String>>,
    subscription: Option<Subscription>,
    task: JoinHandle<()>,
}

impl SoftwareUpdateWatcher {
    /// Start watching; must be called inside a tokio runtime
    ///
    /// `recorded_version` is the version the registry currently holds, if known.
    pub fn spawn(
        router: &NotificationRouter,
        source: Arc<dyn SoftwareVersionSource>,
        registry: Arc<dyn DeviceRegistry>,
        recorded_version: Option<String>,
    ) -> Self {
        let (recorded_tx, recorded) = watch::channel(recorded_version);
        let (check_tx, check_rx) = mpsc::unbounded_channel();

        let subscription = router.subscribe(Topic::SoftwareUpdate, move |payload| {
            if let Payload::SoftwareUpdate(state) = payload {
                tracing::debug!(state = ?state.value, "Software update notification");
            }
            let _ = check_tx.send(());
        });

        let device_id = router.device_id().clone();
        let task = tokio::spawn(run_check_loop(
            device_id,
            source,
            registry,
            check_rx,
            recorded_tx,
        ));

        Self {
            recorded,
            subscription: Some(subscription),
            task,
        }
    }

    /// Version last written to the registry
    pub fn recorded_version(&self) -> Option<String> {
        self.recorded.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<Option<String>> {
        self.recorded.clone()
    }

    /// Detach from the router and stop the task
    ///
    /// Dropping the watcher does the same.
    pub fn shutdown(self) {}
}

impl Drop for SoftwareUpdateWatcher {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.task.abort();
    }
}

async fn run_check_loop(
    device_id: DeviceId,
    source: Arc<dyn SoftwareVersionSource>,
    registry: Arc<dyn DeviceRegistry>,
    mut check_rx: mpsc::UnboundedReceiver<()>,
    recorded_tx: watch::Sender<Option<String>>,
) {
    while check_rx.recv().await.is_some() {
        while check_rx.try_recv().is_ok() {}

        let version = match source.software_version().await {
            Ok(version) => version,
            Err(e) => {
                tracing::warn!(device_id = %device_id, "Failed to fetch software version: {}", e);
                continue;
            }
        };

        let unchanged = recorded_tx.borrow().as_deref() == Some(version.as_str());
        if unchanged {
            tracing::debug!(device_id = %device_id, %version, "Software version unchanged");
            continue;
        }

        match registry.update_software_version(&device_id, &version).await {
            Ok(()) => {
                tracing::info!(device_id = %device_id, %version, "Software version updated");
                recorded_tx.send_replace(Some(version));
            }
            Err(e) => {
                tracing::warn!(
                    device_id = %device_id,
                    %version,
                    "Failed to record software version: {}",
                    e
                );
            }
        }
    }
}
