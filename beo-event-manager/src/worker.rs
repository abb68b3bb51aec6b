//! Link worker
//!
//! Drains the link's event stream on one task: lifecycle events go to the
//! supervisor, notifications to the router. Routing and state merges run
//! inline on this task, so they see notifications in arrival order.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use beo_stream::{Notification, NotificationRouter};

use crate::error::{EventManagerError, Result};
use crate::supervisor::ConnectionSupervisor;

/// Event yielded by a link implementation
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    Connected,
    Disconnected,
    Notification(Notification),
}

/// Counters reported when the worker exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub connects: u64,
    pub disconnects: u64,
    pub notifications: u64,
    /// Notifications the router dropped
    pub dropped: u64,
}

/// Handle to a spawned link worker
///
/// Dropping the handle stops the worker.
pub struct LinkWorker {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<LinkStats>,
}

impl LinkWorker {
    /// Spawn a worker for `link`; must be called inside a tokio runtime
    pub fn spawn<S>(link: S, supervisor: Arc<ConnectionSupervisor>, router: NotificationRouter) -> Self
    where
        S: Stream<Item = LinkEvent> + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run_link_loop(link, supervisor, router, shutdown_rx));
        Self {
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop reading the link and wait for the worker
    pub async fn shutdown(mut self) -> Result<LinkStats> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.join().await
    }

    /// Wait for the link stream to end
    pub async fn join(self) -> Result<LinkStats> {
        self.handle.await.map_err(|e| {
            tracing::error!("Link worker failed: {}", e);
            EventManagerError::WorkerStopped
        })
    }
}

/// Drain `link` until it ends or `shutdown` fires
///
/// The supervisor is told the link is down when the loop exits.
pub async fn run_link_loop<S>(
    link: S,
    supervisor: Arc<ConnectionSupervisor>,
    router: NotificationRouter,
    shutdown: oneshot::Receiver<()>,
) -> LinkStats
where
    S: Stream<Item = LinkEvent>,
{
    futures::pin_mut!(link);
    let mut shutdown = shutdown;
    let mut stats = LinkStats::default();

    tracing::info!(device_id = %router.device_id(), "Link worker started");

    loop {
        tokio::select! {
            event = link.next() => {
                match event {
                    Some(LinkEvent::Connected) => {
                        stats.connects += 1;
                        supervisor.on_connected();
                    }
                    Some(LinkEvent::Disconnected) => {
                        stats.disconnects += 1;
                        supervisor.on_disconnected();
                    }
                    Some(LinkEvent::Notification(notification)) => {
                        stats.notifications += 1;
                        if router.route(&notification).is_none() {
                            stats.dropped += 1;
                        }
                    }
                    None => {
                        tracing::info!(device_id = %router.device_id(), "Link stream ended");
                        break;
                    }
                }
            }

            _ = &mut shutdown => {
                tracing::info!(device_id = %router.device_id(), "Link worker received shutdown");
                break;
            }
        }
    }

    supervisor.on_disconnected();
    tracing::info!(device_id = %router.device_id(), ?stats, "Link worker shut down");
    stats
}
