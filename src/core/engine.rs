//! Alert engine: monitoring state machine with cooldown-gated triggers
//!
//! State transitions:
//! - IDLE → ACTIVE: start() (resets the filter, clears cooldown)
//! - ACTIVE → IDLE: stop() (discards buffered samples, silences audio)
//!
//! Samples are ignored while IDLE. While ACTIVE, a CLOSED verdict
//! triggers the alert unless the cooldown window is still open; the
//! cooldown bounds alert frequency no matter how many consecutive
//! closed frames arrive.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::core::audio::{AudioController, TriggerOutcome};
use crate::core::debounce::DebounceFilter;
use crate::types::{
    AlertDecision, FrameObservation, FrameOutput, MonitorConfig, MonitoringState, Verdict,
};

/// Monitoring state machine
#[derive(Debug)]
pub struct AlertEngine {
    /// Current monitoring state
    state: MonitoringState,
    /// Debounce filter over incoming frames
    filter: DebounceFilter,
    /// Alert sound handle
    audio: AudioController,
    /// Cooldown applied after each fired alert
    cooldown: Duration,
    /// No alert may fire again before this instant
    cooldown_until: Option<Instant>,
    /// Wall-clock time of the last fired alert
    last_alert_at: Option<DateTime<Utc>>,
    /// Most recent verdict while active
    last_verdict: Option<Verdict>,
    /// Frames processed while active
    samples_seen: u64,
    /// Alerts fired since construction
    alerts_fired: u64,
}

impl AlertEngine {
    /// Create a new engine in IDLE
    pub fn new(config: &MonitorConfig, audio: AudioController) -> Self {
        Self {
            state: MonitoringState::Idle,
            filter: DebounceFilter::new(config),
            audio,
            cooldown: config.alert_cooldown(),
            cooldown_until: None,
            last_alert_at: None,
            last_verdict: None,
            samples_seen: 0,
            alerts_fired: 0,
        }
    }

    /// Start monitoring. Idempotent; returns false if already active.
    pub fn start(&mut self) -> bool {
        if self.state == MonitoringState::Active {
            return false;
        }
        self.state = MonitoringState::Active;
        self.filter.reset();
        self.cooldown_until = None;
        info!("monitoring started");
        true
    }

    /// Stop monitoring and silence any playing alert. Idempotent;
    /// returns false if already idle.
    pub fn stop(&mut self) -> bool {
        if self.state == MonitoringState::Idle {
            return false;
        }
        self.state = MonitoringState::Idle;
        self.filter.reset();
        self.audio.stop();
        info!("monitoring stopped");
        true
    }

    /// Feed one detector observation. Returns None while IDLE.
    pub fn on_frame(&mut self, obs: FrameObservation) -> Option<FrameOutput> {
        if self.state != MonitoringState::Active {
            return None;
        }

        self.samples_seen += 1;
        let verdict = self.filter.ingest(obs);
        self.last_verdict = Some(verdict);

        let alert = if verdict == Verdict::Closed {
            self.decide_alert()
        } else {
            AlertDecision::None
        };

        Some(FrameOutput::new(
            verdict,
            alert,
            self.filter.buffered(),
            self.cooldown_remaining_ms(),
        ))
    }

    /// A CLOSED verdict wants an alert; gate it on the cooldown and
    /// on the sound actually starting
    fn decide_alert(&mut self) -> AlertDecision {
        let now = Instant::now();
        if let Some(until) = self.cooldown_until {
            if now < until {
                return AlertDecision::Suppressed;
            }
        }

        match self.audio.trigger() {
            TriggerOutcome::Started => {
                self.cooldown_until = Some(now + self.cooldown);
                self.last_alert_at = Some(Utc::now());
                self.alerts_fired += 1;
                info!(total = self.alerts_fired, "drowsiness alert fired");
                AlertDecision::Fired
            }
            TriggerOutcome::NotReady(state) => {
                // No cooldown armed: the first closed verdict after a
                // successful reload should fire immediately
                warn!(%state, "drowsiness detected but alert sound not ready");
                AlertDecision::NotReady
            }
        }
    }

    /// Get current monitoring state
    pub fn state(&self) -> MonitoringState {
        self.state
    }

    /// Is the engine accepting samples?
    pub fn is_active(&self) -> bool {
        self.state == MonitoringState::Active
    }

    /// Wall-clock time of the last fired alert
    pub fn last_alert_at(&self) -> Option<DateTime<Utc>> {
        self.last_alert_at
    }

    /// Most recent verdict while active
    pub fn last_verdict(&self) -> Option<Verdict> {
        self.last_verdict
    }

    /// Frames processed while active
    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    /// Alerts fired since construction
    pub fn alerts_fired(&self) -> u64 {
        self.alerts_fired
    }

    /// Closed frames currently buffered toward a verdict
    pub fn buffered(&self) -> usize {
        self.filter.buffered()
    }

    /// Milliseconds until another alert may fire (0 when clear)
    pub fn cooldown_remaining_ms(&self) -> u64 {
        match self.cooldown_until {
            Some(until) => until
                .saturating_duration_since(Instant::now())
                .as_millis() as u64,
            None => 0,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
