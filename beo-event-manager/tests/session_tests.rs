//! Integration tests for DeviceSession.
//!
//! These drive a session through a channel-backed link the way a real link
//! implementation would, and check connection status, state, diagnostics and
//! the background watchers.

mod mock_api;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use beo_event_manager::{
    AudioSource, DeviceSession, DiagnosticMode, EventManagerError, LinkEvent, MenuItem,
    SessionConfig,
};
use beo_state::PlaybackState;
use beo_stream::{
    Notification, NotificationTag, Payload, PlaybackProgress, RenderingState,
    SoftwareUpdateState, Source, Topic, VolumeState,
};
use futures::channel::mpsc;
use mock_api::{MockRegistry, MockSourceApi, MockVersionSource};

const DEVICE: &str = "30020041";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn session() -> DeviceSession {
    init_tracing();
    DeviceSession::new(SessionConfig::new(DEVICE)).expect("valid config")
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Timeout waiting for condition");
}

#[tokio::test]
async fn test_link_drives_status_and_state() {
    let session = session();
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&statuses);
    session.subscribe(Topic::ConnectionStatus, move |payload| {
        if let Payload::ConnectionStatus { connected, .. } = payload {
            seen.lock().unwrap().push(*connected);
        }
    });

    let (tx, rx) = mpsc::unbounded();
    let worker = session.spawn_link(rx);

    tx.unbounded_send(LinkEvent::Connected).unwrap();
    tx.unbounded_send(LinkEvent::Connected).unwrap();
    tx.unbounded_send(LinkEvent::Notification(Notification::PlaybackProgress(
        PlaybackProgress::new(61),
    )))
    .unwrap();
    tx.unbounded_send(LinkEvent::Notification(Notification::SourceChange(
        Source::new("lineIn", "Line-In"),
    )))
    .unwrap();
    tx.unbounded_send(LinkEvent::Notification(Notification::Volume(
        VolumeState::new(Some(18), Some(false)),
    )))
    .unwrap();
    tx.unbounded_send(LinkEvent::Notification(Notification::PlaybackState(
        RenderingState::new("started"),
    )))
    .unwrap();
    drop(tx);

    let stats = worker.join().await.expect("worker failed");

    assert_eq!(stats.connects, 2);
    assert_eq!(stats.notifications, 4);
    assert_eq!(stats.dropped, 0);

    // Stream end counts as a disconnect
    assert_eq!(*statuses.lock().unwrap(), vec![true, false]);
    assert!(!session.is_connected());

    // State is kept across the disconnect
    let state = session.snapshot();
    assert_eq!(state.playback_state, PlaybackState::Playing);
    assert_eq!(state.progress.elapsed_secs(), 0);
    assert_eq!(state.volume.level, Some(18));
    assert_eq!(session.displayed_source().unwrap().id, "lineIn");
}

#[tokio::test]
async fn test_shutdown_stops_worker() {
    let session = session();
    let (tx, rx) = mpsc::unbounded();
    let worker = session.spawn_link(rx);

    tx.unbounded_send(LinkEvent::Connected).unwrap();
    wait_until(|| session.is_connected()).await;

    let stats = worker.shutdown().await.expect("worker failed");
    assert_eq!(stats.connects, 1);
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_diagnostics_see_dropped_notifications() {
    let session = session();
    let mut diagnostics = session.diagnostics().expect("broadcast diagnostics");

    let unknown = Notification::Tagged(NotificationTag::new("puc"));
    assert_eq!(session.router().route(&unknown), None);

    let event = diagnostics.try_recv().expect("diagnostic event");
    assert_eq!(event.notification, unknown);
}

#[tokio::test]
async fn test_diagnostics_disabled() {
    init_tracing();
    let config = SessionConfig::new(DEVICE).with_diagnostics(DiagnosticMode::Disabled);
    let session = DeviceSession::new(config).unwrap();
    assert!(session.diagnostics().is_none());
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let result = DeviceSession::new(SessionConfig::new("   "));
    assert!(matches!(result, Err(EventManagerError::Configuration(_))));
}

#[tokio::test]
async fn test_playback_error_reaches_consumer() {
    let session = session();
    let mut errors = session.errors();

    session
        .router()
        .route(&Notification::PlaybackError(beo_stream::PlaybackError {
            error: Some("Network unreachable".to_string()),
        }));

    let error = errors.try_recv().expect("playback error");
    assert_eq!(error.device_id().as_str(), DEVICE);
}

#[tokio::test]
async fn test_detach_state_keeps_last_state() {
    let mut session = session();
    session
        .router()
        .route(&Notification::Volume(VolumeState::new(Some(40), None)));
    session.detach_state();
    session
        .router()
        .route(&Notification::Volume(VolumeState::new(Some(90), None)));

    assert_eq!(session.snapshot().volume.level, Some(40));
}

#[tokio::test]
async fn test_source_list_refreshes_on_menu_change() {
    let session = session();
    let api = MockSourceApi::new(vec![
        AudioSource::new("spotify", "Spotify Connect").with_multiroom(true),
        AudioSource::new("airPlay", "AirPlay"),
    ]);
    let watcher = session.watch_sources(Arc::new(api.clone()));
    let mut rx = watcher.watch();

    // Initial assembly
    tokio::time::timeout(Duration::from_secs(1), rx.wait_for(Option::is_some))
        .await
        .expect("Timeout waiting for source list")
        .expect("Watcher stopped");
    assert_eq!(watcher.latest().unwrap().names(), vec!["Spotify Connect"]);

    api.set_menu(vec![("hdmi1", MenuItem::new("HDMI 1", &["tv"]))]);
    session
        .router()
        .route(&Notification::Tagged(NotificationTag::new("remoteMenuChanged")));

    tokio::time::timeout(
        Duration::from_secs(1),
        rx.wait_for(|list| list.as_ref().map(|l| l.len()) == Some(2)),
    )
    .await
    .expect("Timeout waiting for refresh")
    .expect("Watcher stopped");

    let list = watcher.latest().unwrap();
    assert_eq!(list.names(), vec!["Spotify Connect", "HDMI 1"]);
    assert_eq!(list.is_beolink_expandable("spotify"), Some(true));

    watcher.shutdown();
    assert_eq!(session.router().subscriber_count(&Topic::RemoteMenuChanged), 0);
}

#[tokio::test]
async fn test_software_update_records_only_changes() {
    let session = session();
    let source = MockVersionSource::new("4.0.1");
    let registry = MockRegistry::default();
    let watcher = session.watch_software_updates(
        Arc::new(source.clone()),
        Arc::new(registry.clone()),
        Some("4.0.0".to_string()),
    );

    let update = Notification::SoftwareUpdate(SoftwareUpdateState {
        seconds_remaining: Some(0),
        value: Some("idle".to_string()),
    });

    session.router().route(&update);
    wait_until(|| watcher.recorded_version().as_deref() == Some("4.0.1")).await;

    // Same version again: fetched but not recorded
    session.router().route(&update);
    wait_until(|| source.fetch_count() >= 2).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(
        registry.updates(),
        vec![(beo_stream::DeviceId::new(DEVICE), "4.0.1".to_string())]
    );

    source.set(Ok("4.1.0".to_string()));
    session.router().route(&update);
    wait_until(|| registry.updates().len() == 2).await;
    assert_eq!(watcher.recorded_version().as_deref(), Some("4.1.0"));
}

#[tokio::test]
async fn test_software_update_fetch_failure_is_not_recorded() {
    let session = session();
    let source = MockVersionSource::new("4.0.1");
    source.set(Err(beo_event_manager::ApiError::Request("timeout".to_string())));
    let registry = MockRegistry::default();
    let watcher = session.watch_software_updates(
        Arc::new(source.clone()),
        Arc::new(registry.clone()),
        None,
    );

    session
        .router()
        .route(&Notification::SoftwareUpdate(SoftwareUpdateState::default()));
    wait_until(|| source.fetch_count() == 1).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(registry.updates().is_empty());
    assert_eq!(watcher.recorded_version(), None);
}

#[tokio::test]
async fn test_dropped_watchers_leave_no_handlers() {
    let session = session();
    let api = Arc::new(MockSourceApi::new(vec![AudioSource::new(
        "spotify",
        "Spotify Connect",
    )]));

    for _ in 0..5 {
        drop(session.watch_sources(api.clone()));
    }
    drop(session.watch_software_updates(
        Arc::new(MockVersionSource::new("4.0.1")),
        Arc::new(MockRegistry::default()),
        None,
    ));

    let router = session.router();
    assert_eq!(router.subscriber_count(&Topic::RemoteMenuChanged), 0);
    assert_eq!(router.subscriber_count(&Topic::PlaybackSource), 0);
    assert_eq!(router.subscriber_count(&Topic::SoftwareUpdate), 0);
}
