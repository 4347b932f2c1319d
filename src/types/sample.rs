//! Eye-state samples from the external detector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One per-frame eye-openness measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeStateSample {
    /// When the frame was measured
    pub timestamp: DateTime<Utc>,
    /// Probability the left eye is open, in [0, 1]
    pub left_open_prob: f64,
    /// Probability the right eye is open, in [0, 1]
    pub right_open_prob: f64,
}

impl EyeStateSample {
    /// Create a sample stamped with the current time
    pub fn new(left_open_prob: f64, right_open_prob: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            left_open_prob,
            right_open_prob,
        }
    }

    /// Create a sample carrying the detector's own timestamp
    pub fn with_timestamp(
        timestamp: DateTime<Utc>,
        left_open_prob: f64,
        right_open_prob: f64,
    ) -> Self {
        Self {
            timestamp,
            left_open_prob,
            right_open_prob,
        }
    }

    /// A frame counts as closed only when both eyes are strictly below
    /// the threshold
    pub fn is_closed(&self, threshold: f64) -> bool {
        self.left_open_prob < threshold && self.right_open_prob < threshold
    }
}

/// What the detector reported for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameObservation {
    /// A face was found and measured
    Face(EyeStateSample),
    /// No face visible in this frame
    NoFace,
}

impl From<Option<EyeStateSample>> for FrameObservation {
    fn from(value: Option<EyeStateSample>) -> Self {
        match value {
            Some(sample) => FrameObservation::Face(sample),
            None => FrameObservation::NoFace,
        }
    }
}
