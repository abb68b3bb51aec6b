//! Topic-based notification routing.
//!
//! The [`NotificationRouter`] receives every decoded notification from the
//! link, hands it unfiltered to the diagnostic sink, classifies it and
//! delivers the resulting payload synchronously to every subscriber of the
//! topic.
//!
//! The subscriber table is copy-on-write: `publish` takes a snapshot of the
//! topic's subscriber list under a short read lock and delivers with no lock
//! held. Subscribing or unsubscribing while a delivery is in flight (even
//! from inside a handler) is therefore safe; the change applies to the next
//! publish.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::classify::{classify, Routed};
use crate::device_id::DeviceId;
use crate::diagnostic::{DiagnosticSink, NoopSink};
use crate::notification::Notification;
use crate::topic::{Payload, Topic};

/// Subscriber callback
pub type Handler = Arc<dyn Fn(&Payload) + Send + Sync>;

#[derive(Clone)]
struct Entry {
    id: u64,
    handler: Handler,
}

type SubscriberTable = HashMap<Topic, Arc<[Entry]>>;

struct RouterInner {
    device_id: DeviceId,
    subscribers: RwLock<SubscriberTable>,
    next_id: AtomicU64,
    sink: Arc<dyn DiagnosticSink>,
}

/// Routes notifications to topic subscribers
///
/// Cloning is cheap; clones share the same subscriber table.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use beo_stream::{DeviceId, Notification, NotificationRouter, NotificationTag, Topic};
///
/// let router = NotificationRouter::new(DeviceId::new("30020041"));
/// let count = Arc::new(AtomicUsize::new(0));
///
/// let seen = Arc::clone(&count);
/// let _sub = router.subscribe(Topic::Beolink, move |payload| {
///     assert!(payload.is_empty());
///     seen.fetch_add(1, Ordering::SeqCst);
/// });
///
/// router.route(&Notification::Tagged(NotificationTag::new("beolinkPeers")));
/// assert_eq!(count.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone)]
pub struct NotificationRouter {
    inner: Arc<RouterInner>,
}

impl NotificationRouter {
    /// Create a router with no diagnostic sink
    pub fn new(device_id: DeviceId) -> Self {
        Self::with_diagnostics(device_id, Arc::new(NoopSink))
    }

    /// Create a router that forwards every raw notification to `sink`
    pub fn with_diagnostics(device_id: DeviceId, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                device_id,
                subscribers: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                sink,
            }),
        }
    }

    /// Device this router belongs to
    pub fn device_id(&self) -> &DeviceId {
        &self.inner.device_id
    }

    /// Register a handler for a topic
    ///
    /// The handler runs on the link's dispatch sequence. It must not block;
    /// hand slow work to a separate task.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let entry = Entry {
            id,
            handler: Arc::new(handler),
        };

        {
            let mut table = self.inner.subscribers.write();
            let updated: Arc<[Entry]> = match table.get(&topic) {
                Some(existing) => existing
                    .iter()
                    .cloned()
                    .chain(std::iter::once(entry))
                    .collect(),
                None => Arc::from(vec![entry]),
            };
            table.insert(topic.clone(), updated);
        }

        tracing::debug!(
            device_id = %self.inner.device_id,
            topic = %topic,
            subscription = id,
            "Subscribed"
        );

        Subscription {
            router: Arc::downgrade(&self.inner),
            topic,
            id,
        }
    }

    /// Deliver a payload to every current subscriber of `topic`
    ///
    /// Returns the number of subscribers that handled the payload without
    /// panicking. A panicking subscriber is logged and skipped.
    pub fn publish(&self, topic: &Topic, payload: &Payload) -> usize {
        let snapshot = self.inner.subscribers.read().get(topic).cloned();

        let Some(entries) = snapshot else {
            tracing::trace!(topic = %topic, "No subscribers");
            return 0;
        };

        let mut delivered = 0;
        for entry in entries.iter() {
            let handler = &entry.handler;
            match panic::catch_unwind(AssertUnwindSafe(|| handler(payload))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::error!(
                        device_id = %self.inner.device_id,
                        topic = %topic,
                        subscription = entry.id,
                        "Subscriber panicked while handling notification"
                    );
                }
            }
        }

        delivered
    }

    /// Entry point for the link: record, classify and publish a notification
    ///
    /// Returns the topic the notification was published on, or `None` when it
    /// was dropped (unknown sub-type or malformed payload).
    pub fn route(&self, notification: &Notification) -> Option<Topic> {
        self.record_diagnostic(notification);

        match classify(notification) {
            Ok(Some(Routed { topic, payload })) => {
                let delivered = self.publish(&topic, &payload);
                tracing::debug!(
                    device_id = %self.inner.device_id,
                    kind = notification.kind(),
                    topic = %topic,
                    delivered,
                    "Routed notification"
                );
                Some(topic)
            }
            Ok(None) => {
                tracing::debug!(
                    device_id = %self.inner.device_id,
                    kind = notification.kind(),
                    "Dropping notification with unknown sub-type"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    device_id = %self.inner.device_id,
                    "Dropping notification: {}",
                    e
                );
                None
            }
        }
    }

    /// Number of subscribers currently registered for a topic
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.inner
            .subscribers
            .read()
            .get(topic)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    fn record_diagnostic(&self, notification: &Notification) {
        let sink = &self.inner.sink;
        let device_id = &self.inner.device_id;
        if panic::catch_unwind(AssertUnwindSafe(|| sink.record(device_id, notification))).is_err() {
            tracing::error!(
                device_id = %device_id,
                kind = notification.kind(),
                "Diagnostic sink panicked"
            );
        }
    }
}

impl RouterInner {
    fn remove(&self, topic: &Topic, id: u64) -> bool {
        let mut table = self.subscribers.write();

        let Some(existing) = table.get(topic) else {
            return false;
        };

        if !existing.iter().any(|entry| entry.id == id) {
            return false;
        }

        let remaining: Vec<Entry> = existing
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();

        if remaining.is_empty() {
            table.remove(topic);
        } else {
            table.insert(topic.clone(), Arc::from(remaining));
        }

        true
    }
}

/// Handle to a registered subscriber
///
/// Dropping the handle leaves the subscription in place; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
pub struct Subscription {
    router: Weak<RouterInner>,
    topic: Topic,
    id: u64,
}

impl Subscription {
    /// Topic this subscription listens on
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Remove the handler from the router
    ///
    /// Returns `false` if the router is gone or the handler was already removed.
    pub fn unsubscribe(self) -> bool {
        let Some(router) = self.router.upgrade() else {
            return false;
        };

        let removed = router.remove(&self.topic, self.id);
        if removed {
            tracing::debug!(topic = %self.topic, subscription = self.id, "Unsubscribed");
        }
        removed
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_event::KeyEvent;
    use crate::notification::{ButtonEvent, VolumeState};
    use std::sync::Mutex;

    fn router() -> NotificationRouter {
        NotificationRouter::new(DeviceId::new("30020041"))
    }

    fn recorder() -> (Arc<Mutex<Vec<Payload>>>, impl Fn(&Payload) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |p: &Payload| sink.lock().unwrap().push(p.clone()))
    }

    #[test]
    fn test_publish_reaches_subscriber() {
        let router = router();
        let (seen, handler) = recorder();
        let _sub = router.subscribe(Topic::Volume, handler);

        let payload = Payload::Volume(VolumeState::new(Some(10), None));
        assert_eq!(router.publish(&Topic::Volume, &payload), 1);
        assert_eq!(*seen.lock().unwrap(), vec![payload]);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let router = router();
        assert_eq!(router.publish(&Topic::Volume, &Payload::Empty), 0);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let router = router();
        let (seen, handler) = recorder();
        let sub = router.subscribe(Topic::Volume, handler);

        assert!(sub.unsubscribe());
        assert_eq!(router.subscriber_count(&Topic::Volume), 0);

        router.publish(&Topic::Volume, &Payload::Empty);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsubscribe_after_router_dropped() {
        let router = router();
        let sub = router.subscribe(Topic::Volume, |_| {});
        drop(router);
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let router = router();
        let (seen, handler) = recorder();
        let _bad = router.subscribe(Topic::Volume, |_| panic!("boom"));
        let _good = router.subscribe(Topic::Volume, handler);

        let delivered = router.publish(&Topic::Volume, &Payload::Empty);

        assert_eq!(delivered, 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_subscribe_from_inside_handler() {
        let router = router();
        let inner_router = router.clone();
        let _sub = router.subscribe(Topic::Configuration, move |_| {
            // Takes the write lock while a publish is in flight
            let _nested = inner_router.subscribe(Topic::Beolink, |_| {});
        });

        router.publish(&Topic::Configuration, &Payload::Empty);
        assert_eq!(router.subscriber_count(&Topic::Beolink), 1);
    }

    #[test]
    fn test_route_button_to_keyed_topic() {
        let router = router();
        let (preset1, handler1) = recorder();
        let (preset2, handler2) = recorder();
        let _s1 = router.subscribe(Topic::button("Preset1"), handler1);
        let _s2 = router.subscribe(Topic::button("Preset2"), handler2);

        let topic = router.route(&Notification::Button(ButtonEvent::new(
            "Preset1",
            "shortPress (Release)",
        )));

        assert_eq!(topic, Some(Topic::button("Preset1")));
        assert_eq!(
            *preset1.lock().unwrap(),
            vec![Payload::Key(KeyEvent::ShortPress)]
        );
        assert!(preset2.lock().unwrap().is_empty());
    }

    #[test]
    fn test_route_malformed_returns_none() {
        let router = router();
        let topic = router.route(&Notification::Button(ButtonEvent::default()));
        assert_eq!(topic, None);
    }
}
