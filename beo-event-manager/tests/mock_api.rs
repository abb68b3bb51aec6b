//! Hand-written mock collaborators for session tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use beo_event_manager::{ApiError, AudioSource, DeviceRegistry, MenuItem, SoftwareVersionSource, SourceApi};
use beo_stream::DeviceId;

/// Source API whose answers can be changed between calls
#[derive(Clone, Default)]
pub struct MockSourceApi {
    pub audio: Arc<Mutex<Vec<AudioSource>>>,
    pub menu: Arc<Mutex<Vec<(String, MenuItem)>>>,
    pub calls: Arc<AtomicUsize>,
}

impl MockSourceApi {
    pub fn new(audio: Vec<AudioSource>) -> Self {
        let api = Self::default();
        *api.audio.lock().unwrap() = audio;
        api
    }

    pub fn set_menu(&self, menu: Vec<(&str, MenuItem)>) {
        *self.menu.lock().unwrap() = menu.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceApi for MockSourceApi {
    async fn available_sources(&self) -> Result<Vec<AudioSource>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.audio.lock().unwrap().clone())
    }

    async fn remote_menu(&self) -> Result<Vec<(String, MenuItem)>, ApiError> {
        Ok(self.menu.lock().unwrap().clone())
    }
}

/// Version source returning a settable version
#[derive(Clone)]
pub struct MockVersionSource {
    pub version: Arc<Mutex<Result<String, ApiError>>>,
    pub fetches: Arc<AtomicUsize>,
}

impl MockVersionSource {
    pub fn new(version: &str) -> Self {
        Self {
            version: Arc::new(Mutex::new(Ok(version.to_string()))),
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set(&self, version: Result<String, ApiError>) {
        *self.version.lock().unwrap() = version;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SoftwareVersionSource for MockVersionSource {
    async fn software_version(&self) -> Result<String, ApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.version.lock().unwrap().clone()
    }
}

/// Registry recording every update request
#[derive(Clone, Default)]
pub struct MockRegistry {
    pub updates: Arc<Mutex<Vec<(DeviceId, String)>>>,
}

impl MockRegistry {
    pub fn updates(&self) -> Vec<(DeviceId, String)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceRegistry for MockRegistry {
    async fn update_software_version(&self, device_id: &DeviceId, version: &str) -> Result<(), ApiError> {
        self.updates
            .lock()
            .unwrap()
            .push((device_id.clone(), version.to_string()));
        Ok(())
    }
}
