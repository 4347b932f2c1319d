//! Debounce filter: N consecutive closed frames before a CLOSED verdict
//!
//! Verdict rules:
//! - CLOSED: all of the last N frames closed (both eyes below threshold)
//! - OPEN: most recent frame open; clears the window immediately
//! - INSUFFICIENT: fewer than N frames buffered, or no face in frame
//!
//! An open frame cancelling the whole streak biases toward fewer false
//! alerts over faster detection.

use std::collections::VecDeque;

use crate::types::{EyeStateSample, FaceLossPolicy, FrameObservation, MonitorConfig, Verdict};

/// Rolling window over recent closed frames
#[derive(Debug)]
pub struct DebounceFilter {
    /// Buffered closed frames, oldest first. Only closed frames are
    /// kept, so a full window is by construction an all-closed streak.
    window: VecDeque<EyeStateSample>,
    /// Frames required for a CLOSED verdict
    frames: usize,
    /// Closed-frame probability threshold
    threshold: f64,
    /// What to do with the window when the face is lost
    face_loss: FaceLossPolicy,
}

impl DebounceFilter {
    /// Create a filter from engine configuration. The window is at
    /// least one frame wide; a zero-frame window would produce CLOSED
    /// verdicts from an empty buffer.
    pub fn new(config: &MonitorConfig) -> Self {
        let frames = config.debounce_frames.max(1);
        Self {
            window: VecDeque::with_capacity(frames),
            frames,
            threshold: config.closed_eye_threshold,
            face_loss: config.face_loss,
        }
    }

    /// Feed one observation, get the debounced verdict
    pub fn ingest(&mut self, obs: FrameObservation) -> Verdict {
        match obs {
            FrameObservation::NoFace => {
                if self.face_loss == FaceLossPolicy::Reset {
                    self.window.clear();
                }
                Verdict::Insufficient
            }
            FrameObservation::Face(sample) => {
                if !sample.is_closed(self.threshold) {
                    self.window.clear();
                    return Verdict::Open;
                }

                self.window.push_back(sample);
                if self.window.len() > self.frames {
                    self.window.pop_front();
                }

                if self.window.len() < self.frames {
                    Verdict::Insufficient
                } else {
                    Verdict::Closed
                }
            }
        }
    }

    /// Closed frames currently buffered
    pub fn buffered(&self) -> usize {
        self.window.len()
    }

    /// Clear the window
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
