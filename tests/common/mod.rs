//! Shared test doubles for the integration suites

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use vigil::core::{AudioBackend, CameraAccess, MonitorSession, PermissionStatus};
use vigil::types::{EyeStateSample, FrameObservation, MonitorConfig};

/// Scriptable audio backend: configurable results and delays, counted
/// calls, audible flag raised only while sound would be heard
pub struct MockAudioBackend {
    pub load_result: Mutex<Result<(), String>>,
    pub load_delay_ms: AtomicU64,
    pub play_result: Mutex<Result<(), String>>,
    pub play_duration_ms: AtomicU64,
    pub loads: AtomicU64,
    pub plays: AtomicU64,
    pub stops: AtomicU64,
    pub releases: AtomicU64,
    pub audible: AtomicBool,
}

impl Default for MockAudioBackend {
    fn default() -> Self {
        Self {
            load_result: Mutex::new(Ok(())),
            load_delay_ms: AtomicU64::new(0),
            play_result: Mutex::new(Ok(())),
            play_duration_ms: AtomicU64::new(100),
            loads: AtomicU64::new(0),
            plays: AtomicU64::new(0),
            stops: AtomicU64::new(0),
            releases: AtomicU64::new(0),
            audible: AtomicBool::new(false),
        }
    }
}

impl MockAudioBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        let backend = Self::default();
        *backend.load_result.lock() = Err(reason.to_string());
        Arc::new(backend)
    }

    pub fn set_load_result(&self, result: Result<(), String>) {
        *self.load_result.lock() = result;
    }

    pub fn set_play_result(&self, result: Result<(), String>) {
        *self.play_result.lock() = result;
    }
}

#[async_trait]
impl AudioBackend for MockAudioBackend {
    async fn load(&self, _locator: &str) -> Result<(), String> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let delay = self.load_delay_ms.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.load_result.lock().clone()
    }

    async fn play(&self) -> Result<(), String> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        self.audible.store(true, Ordering::SeqCst);
        let duration = self.play_duration_ms.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(duration)).await;
        self.audible.store(false, Ordering::SeqCst);
        self.play_result.lock().clone()
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.audible.store(false, Ordering::SeqCst);
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.audible.store(false, Ordering::SeqCst);
    }
}

/// Camera stub with scriptable permission and device presence
pub struct StubCamera {
    pub permitted: AtomicBool,
    pub present: AtomicBool,
}

impl StubCamera {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            permitted: AtomicBool::new(true),
            present: AtomicBool::new(true),
        })
    }

    pub fn denying() -> Arc<Self> {
        let camera = Self::new();
        camera.permitted.store(false, Ordering::SeqCst);
        camera
    }

    pub fn absent() -> Arc<Self> {
        let camera = Self::new();
        camera.present.store(false, Ordering::SeqCst);
        camera
    }
}

impl CameraAccess for StubCamera {
    fn request_permission(&self) -> PermissionStatus {
        if self.permitted.load(Ordering::SeqCst) {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    fn device_available(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }
}

/// A frame with both eyes well below the closed threshold
pub fn closed_frame() -> FrameObservation {
    FrameObservation::Face(EyeStateSample::new(0.1, 0.1))
}

/// A frame with both eyes well above the closed threshold
pub fn open_frame() -> FrameObservation {
    FrameObservation::Face(EyeStateSample::new(0.9, 0.9))
}

/// Session over a ready mock backend and a permissive camera
pub fn mock_session(backend: Arc<MockAudioBackend>) -> MonitorSession {
    MonitorSession::new(
        MonitorConfig::default(),
        backend,
        StubCamera::new(),
        "mock://alert",
    )
}
