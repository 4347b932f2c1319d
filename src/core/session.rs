//! Monitoring session: the façade the presentation layer talks to
//!
//! Sequencing on start: camera device check, permission request, audio
//! preload kick (first attempt only), engine start. Permission is
//! re-requested on every start attempt; a FAILED audio load is never
//! retried here - recovery goes through reload_audio.
//!
//! The sampling context (frames) and the control context (start/stop)
//! both funnel into the engine mutex. Critical sections are short and
//! never await; audio completions take only the controller's own lock,
//! so lock order is fixed: engine, then audio.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::core::audio::{AudioBackend, AudioController};
use crate::core::engine::AlertEngine;
use crate::types::{
    AlertDecision, FrameObservation, FrameOutput, MonitorConfig, MonitorError, MonitorStatus,
    MonitoringState, ResourceState, Verdict,
};
use crate::UPDATE_CHANNEL_CAPACITY;

/// Outcome of a camera permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Camera collaborators the session consults before starting. The real
/// capture pipeline lives outside this crate; the CLI installs a
/// simulated implementation and tests install stubs.
pub trait CameraAccess: Send + Sync {
    /// Ask for camera permission. Called on every start attempt.
    fn request_permission(&self) -> PermissionStatus;

    /// Is a usable camera device present?
    fn device_available(&self) -> bool;
}

/// Stand-in camera for the CLI: always present, always permitted
#[derive(Debug, Default)]
pub struct SimulatedCamera;

impl CameraAccess for SimulatedCamera {
    fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    fn device_available(&self) -> bool {
        true
    }
}

/// Non-fatal audio condition surfaced by a successful start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioWarning {
    /// Load still in flight; the alert sound may not work immediately
    StillLoading,
    /// Load failed earlier; no sound until an explicit reload succeeds
    Unavailable(String),
}

/// What start_monitoring reports back on success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartReport {
    /// True when monitoring was already running (start was a no-op)
    pub already_active: bool,
    /// Non-fatal audio condition, if any
    pub audio_warning: Option<AudioWarning>,
}

/// Live update pushed to subscribers on every accepted frame and on
/// each start/stop transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub monitoring: MonitoringState,
    pub verdict: Option<Verdict>,
    pub alert: Option<AlertDecision>,
    pub audio: ResourceState,
    pub buffered: usize,
    pub cooldown_remaining_ms: u64,
    pub alerts_fired: u64,
}

/// Top-level session: owns the engine, the audio controller, and the
/// live-update channel
pub struct MonitorSession {
    engine: Mutex<AlertEngine>,
    audio: AudioController,
    camera: Arc<dyn CameraAccess>,
    sound_locator: String,
    update_tx: broadcast::Sender<StatusUpdate>,
}

impl MonitorSession {
    /// Create a session over an audio backend and camera collaborator.
    /// The sound locator is opaque to the session; the backend decides
    /// what it means.
    pub fn new(
        config: MonitorConfig,
        backend: Arc<dyn AudioBackend>,
        camera: Arc<dyn CameraAccess>,
        sound_locator: impl Into<String>,
    ) -> Self {
        let audio = AudioController::new(backend);
        let engine = AlertEngine::new(&config, audio.clone());
        let (update_tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            engine: Mutex::new(engine),
            audio,
            camera,
            sound_locator: sound_locator.into(),
            update_tx,
        }
    }

    /// Begin monitoring. Checks the camera collaborators, kicks the
    /// first audio preload, and starts the engine. Idempotent.
    pub fn start_monitoring(&self) -> Result<StartReport, MonitorError> {
        if !self.camera.device_available() {
            warn!("start refused: no camera device");
            return Err(MonitorError::DetectorUnavailable);
        }
        if self.camera.request_permission() == PermissionStatus::Denied {
            warn!("start refused: camera permission denied");
            return Err(MonitorError::PermissionDenied);
        }

        // First load attempt only; a FAILED resource stays failed
        // until reload_audio is called
        if self.audio.state() == ResourceState::Unloaded {
            let _ = self.audio.preload(&self.sound_locator);
        }

        let already_active = !self.engine.lock().start();

        let audio_warning = match self.audio.state() {
            ResourceState::Loading => {
                warn!("alert sound still loading; alerts may be silent at first");
                Some(AudioWarning::StillLoading)
            }
            ResourceState::Failed(reason) => {
                warn!(%reason, "alert sound unavailable; monitoring without audio");
                Some(AudioWarning::Unavailable(reason))
            }
            _ => None,
        };

        self.broadcast(None, None);
        Ok(StartReport {
            already_active,
            audio_warning,
        })
    }

    /// Stop monitoring and silence any playing alert. Idempotent;
    /// returns false when already idle.
    pub fn stop_monitoring(&self) -> bool {
        let stopped = self.engine.lock().stop();
        if stopped {
            self.broadcast(None, None);
        }
        stopped
    }

    /// Explicitly re-attempt the audio load. The only recovery path
    /// from FAILED. Returns the state observable after the kick
    /// (LOADING when a load was actually started).
    pub fn reload_audio(&self) -> ResourceState {
        let _ = self.audio.preload(&self.sound_locator);
        self.audio.state()
    }

    /// Feed one detector observation. Returns None while idle.
    pub fn on_frame(&self, obs: FrameObservation) -> Option<FrameOutput> {
        let output = self.engine.lock().on_frame(obs);
        if let Some(ref out) = output {
            self.broadcast(Some(out.verdict), Some(out.alert));
        }
        output
    }

    /// Point-in-time snapshot for UI binding
    pub fn status(&self) -> MonitorStatus {
        let engine = self.engine.lock();
        let audio = self.audio.state();
        MonitorStatus {
            timestamp: chrono::Utc::now(),
            monitoring: engine.state(),
            alert_ready: audio.is_ready(),
            audio,
            last_alert_at: engine.last_alert_at(),
            last_verdict: engine.last_verdict(),
            samples_seen: engine.samples_seen(),
            alerts_fired: engine.alerts_fired(),
            playback_failures: self.audio.playback_failures(),
            cooldown_remaining_ms: engine.cooldown_remaining_ms(),
        }
    }

    /// Is the session currently monitoring?
    pub fn is_monitoring(&self) -> bool {
        self.engine.lock().is_active()
    }

    /// Subscribe to live status updates
    pub fn subscribe(&self) -> broadcast::Receiver<StatusUpdate> {
        self.update_tx.subscribe()
    }

    /// Session teardown: stop monitoring and release the audio
    /// resource. Safe to call more than once.
    pub fn shutdown(&self) {
        self.engine.lock().stop();
        self.audio.release();
        info!("session shut down");
    }

    fn broadcast(&self, verdict: Option<Verdict>, alert: Option<AlertDecision>) {
        let engine = self.engine.lock();
        let update = StatusUpdate {
            monitoring: engine.state(),
            verdict,
            alert,
            audio: self.audio.state(),
            buffered: engine.buffered(),
            cooldown_remaining_ms: engine.cooldown_remaining_ms(),
            alerts_fired: engine.alerts_fired(),
        };
        drop(engine);
        // No subscribers is fine
        let _ = self.update_tx.send(update);
    }
}

// =============================================================================
// TESTS
// =============================================================================
