//! Connection supervisor
//!
//! Tracks whether the link is up and publishes `ConnectionStatus` on every
//! transition. Repeated lifecycle callbacks with the same state are absorbed.

use std::sync::atomic::{AtomicBool, Ordering};

use beo_stream::{DeviceId, NotificationRouter, Payload, Topic};

/// Link connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Owns the connection state of one device
pub struct ConnectionSupervisor {
    router: NotificationRouter,
    connected: AtomicBool,
}

impl ConnectionSupervisor {
    /// Starts disconnected
    pub fn new(router: NotificationRouter) -> Self {
        Self {
            router,
            connected: AtomicBool::new(false),
        }
    }

    pub fn device_id(&self) -> &DeviceId {
        self.router.device_id()
    }

    /// The link connected; returns whether this was a transition
    pub fn on_connected(&self) -> bool {
        self.transition(true)
    }

    /// The link was lost; returns whether this was a transition
    pub fn on_disconnected(&self) -> bool {
        self.transition(false)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ConnectionState {
        if self.is_connected() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    fn transition(&self, connected: bool) -> bool {
        if self.connected.swap(connected, Ordering::AcqRel) == connected {
            tracing::trace!(device_id = %self.device_id(), connected, "Connection state unchanged");
            return false;
        }

        if connected {
            tracing::info!(device_id = %self.device_id(), "Connected to device");
        } else {
            tracing::error!(device_id = %self.device_id(), "Lost connection to device");
        }

        self.router.publish(
            &Topic::ConnectionStatus,
            &Payload::ConnectionStatus {
                device_id: self.device_id().clone(),
                connected,
            },
        );
        true
    }
}

impl std::fmt::Debug for ConnectionSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSupervisor")
            .field("device_id", self.device_id())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn supervisor() -> (ConnectionSupervisor, Arc<Mutex<Vec<bool>>>) {
        let router = NotificationRouter::new(DeviceId::new("30020041"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        router.subscribe(Topic::ConnectionStatus, move |payload| {
            if let Payload::ConnectionStatus { connected, .. } = payload {
                sink.lock().unwrap().push(*connected);
            }
        });
        (ConnectionSupervisor::new(router), seen)
    }

    #[test]
    fn test_starts_disconnected() {
        let (supervisor, _) = supervisor();
        assert!(!supervisor.is_connected());
        assert_eq!(supervisor.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_publishes_once_per_transition() {
        let (supervisor, seen) = supervisor();

        assert!(supervisor.on_connected());
        assert!(!supervisor.on_connected());
        assert!(supervisor.on_disconnected());
        assert!(!supervisor.on_disconnected());

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_disconnect_while_disconnected_is_silent() {
        let (supervisor, seen) = supervisor();
        assert!(!supervisor.on_disconnected());
        assert!(seen.lock().unwrap().is_empty());
    }
}
