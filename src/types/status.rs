//! Session status snapshot for UI binding

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MonitoringState, ResourceState, Verdict};

/// Point-in-time view of the whole session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorStatus {
    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,
    /// Monitoring on/off
    pub monitoring: MonitoringState,
    /// Alert sound lifecycle state
    pub audio: ResourceState,
    /// True when the alert sound is loaded (READY or PLAYING)
    pub alert_ready: bool,
    /// Wall-clock time of the last fired alert
    pub last_alert_at: Option<DateTime<Utc>>,
    /// Most recent verdict while active
    pub last_verdict: Option<Verdict>,
    /// Frames processed while active
    pub samples_seen: u64,
    /// Alerts fired since construction
    pub alerts_fired: u64,
    /// Playback attempts that failed (resource stayed loaded)
    pub playback_failures: u64,
    /// Milliseconds until another alert may fire (0 when clear)
    pub cooldown_remaining_ms: u64,
}

impl MonitorStatus {
    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.monitoring.color_code();
        let reset = MonitoringState::color_reset();

        let last_alert = match self.last_alert_at {
            Some(at) => at.format("%H:%M:%S").to_string(),
            None => "never".to_string(),
        };

        format!(
            "{}{} monitoring={} | audio={} {} | alerts={} | last_alert={} | samples={}{}",
            color,
            self.monitoring.emoji(),
            self.monitoring,
            self.audio.emoji(),
            self.audio,
            self.alerts_fired,
            last_alert,
            self.samples_seen,
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let last_alert = match self.last_alert_at {
            Some(at) => at.format("%H:%M:%S").to_string(),
            None => "never".to_string(),
        };

        format!(
            "monitoring={} | audio={} | alert_ready={} | alerts={} | last_alert={} | samples={} | failures={}",
            self.monitoring,
            self.audio,
            self.alert_ready,
            self.alerts_fired,
            last_alert,
            self.samples_seen,
            self.playback_failures
        )
    }
}
