//! Engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{ALERT_COOLDOWN_MS, DEBOUNCE_WINDOW_FRAMES, EYE_CLOSED_THRESHOLD};

/// What the debounce window does when the detector loses the face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaceLossPolicy {
    /// Keep buffered frames; a lost face neither counts as closed nor
    /// destroys a building streak
    #[default]
    Hold,
    /// Clear the window; the closed streak must rebuild from scratch
    Reset,
}

/// Tunable parameters for the decision engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Eye-openness probability below which a frame counts as closed
    pub closed_eye_threshold: f64,
    /// Consecutive closed frames required before alerting
    pub debounce_frames: usize,
    /// Minimum interval between alerts (milliseconds)
    pub alert_cooldown_ms: u64,
    /// Window behavior when the face is momentarily lost
    pub face_loss: FaceLossPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            closed_eye_threshold: EYE_CLOSED_THRESHOLD,
            debounce_frames: DEBOUNCE_WINDOW_FRAMES,
            alert_cooldown_ms: ALERT_COOLDOWN_MS,
            face_loss: FaceLossPolicy::default(),
        }
    }
}

impl MonitorConfig {
    /// Faster detection at the cost of more false alerts
    pub fn strict() -> Self {
        Self {
            debounce_frames: 2,
            alert_cooldown_ms: 2000,
            ..Self::default()
        }
    }

    /// Slower detection, fewer false alerts
    pub fn lenient() -> Self {
        Self {
            debounce_frames: 5,
            alert_cooldown_ms: 5000,
            ..Self::default()
        }
    }

    /// Cooldown as a Duration
    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_millis(self.alert_cooldown_ms)
    }
}
