//! Per-frame engine output

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Verdict;

/// What the engine decided about alerting on this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertDecision {
    /// No closed-eye condition present
    None,
    /// Closed verdict inside the cooldown window
    Suppressed,
    /// Alert playback was started; cooldown armed
    Fired,
    /// Closed verdict but the sound is not ready; no cooldown armed
    NotReady,
}

impl std::fmt::Display for AlertDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AlertDecision::None => "NONE",
            AlertDecision::Suppressed => "SUPPRESSED",
            AlertDecision::Fired => "FIRED",
            AlertDecision::NotReady => "NOT_READY",
        };
        write!(f, "{}", name)
    }
}

/// Output structure for each processed frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOutput {
    /// When the engine processed the frame
    pub timestamp: DateTime<Utc>,
    /// Debounced verdict for this frame
    pub verdict: Verdict,
    /// Alert decision taken on this frame
    pub alert: AlertDecision,
    /// Closed frames currently buffered toward a verdict
    pub buffered: usize,
    /// Milliseconds until another alert may fire (0 when clear)
    pub cooldown_remaining_ms: u64,
}

impl FrameOutput {
    /// Create new output stamped with the current time
    pub fn new(
        verdict: Verdict,
        alert: AlertDecision,
        buffered: usize,
        cooldown_remaining_ms: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            verdict,
            alert,
            buffered,
            cooldown_remaining_ms,
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.verdict.color_code();
        let reset = Verdict::color_reset();
        let emoji = self.verdict.emoji();

        format!(
            "{}{} verdict={} | alert={} | buffered={} | cooldown={:.1}s{}",
            color,
            emoji,
            self.verdict,
            self.alert,
            self.buffered,
            self.cooldown_remaining_ms as f64 / 1000.0,
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "verdict={} | alert={} | buffered={} | cooldown={:.1}s",
            self.verdict,
            self.alert,
            self.buffered,
            self.cooldown_remaining_ms as f64 / 1000.0
        )
    }
}
