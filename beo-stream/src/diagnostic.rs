//! Diagnostic sinks
//!
//! The router hands every notification to its sink before classification,
//! including ones that are later dropped. Sinks must be cheap and must not
//! block; the router calls them on the link's dispatch sequence.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::device_id::DeviceId;
use crate::notification::Notification;

/// Receives every raw notification, unfiltered
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, device_id: &DeviceId, notification: &Notification);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn record(&self, _device_id: &DeviceId, _notification: &Notification) {}
}

/// Logs every notification as JSON at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, device_id: &DeviceId, notification: &Notification) {
        match serde_json::to_string(notification) {
            Ok(json) => tracing::debug!(
                target: "beo_stream::diagnostic",
                device_id = %device_id,
                kind = notification.kind(),
                payload = %json,
                "Notification received"
            ),
            Err(e) => tracing::debug!(
                target: "beo_stream::diagnostic",
                device_id = %device_id,
                kind = notification.kind(),
                "Notification received (unserializable: {})",
                e
            ),
        }
    }
}

/// One recorded notification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticEvent {
    pub device_id: DeviceId,
    pub notification: Notification,
}

/// Republishes every notification on a broadcast channel
///
/// Slow receivers lag and lose the oldest events; the router is never held up.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<DiagnosticEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DiagnosticEvent> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl DiagnosticSink for BroadcastSink {
    fn record(&self, device_id: &DeviceId, notification: &Notification) {
        // No receivers is not an error
        let _ = self.tx.send(DiagnosticEvent {
            device_id: device_id.clone(),
            notification: notification.clone(),
        });
    }
}
