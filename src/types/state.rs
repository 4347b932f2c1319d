//! Monitoring and audio-resource states

use serde::{Deserialize, Serialize};

/// Whether the engine is accepting samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitoringState {
    /// Not monitoring; samples are ignored
    Idle,
    /// Monitoring; closed-eye streaks may fire alerts
    Active,
}

impl MonitoringState {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            MonitoringState::Idle => "\x1b[90m",   // Gray
            MonitoringState::Active => "\x1b[32m", // Green
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for state
    pub fn emoji(&self) -> &'static str {
        match self {
            MonitoringState::Idle => "⏸",
            MonitoringState::Active => "▶",
        }
    }
}

impl std::fmt::Display for MonitoringState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MonitoringState::Idle => "IDLE",
            MonitoringState::Active => "ACTIVE",
        };
        write!(f, "{}", name)
    }
}

/// Lifecycle of the alert sound resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceState {
    /// Nothing loaded yet
    Unloaded,
    /// A load is in flight
    Loading,
    /// Loaded and playable
    Ready,
    /// Load failed; stays failed until an explicit reload
    Failed(String),
    /// Playback in progress
    Playing,
}

impl ResourceState {
    /// Loaded and able to play (READY or PLAYING)
    pub fn is_ready(&self) -> bool {
        matches!(self, ResourceState::Ready | ResourceState::Playing)
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            ResourceState::Unloaded => "\x1b[90m",  // Gray
            ResourceState::Loading => "\x1b[33m",   // Yellow
            ResourceState::Ready => "\x1b[32m",     // Green
            ResourceState::Failed(_) => "\x1b[31m", // Red
            ResourceState::Playing => "\x1b[36m",   // Cyan
        }
    }

    /// Get emoji for state
    pub fn emoji(&self) -> &'static str {
        match self {
            ResourceState::Unloaded => "⚪",
            ResourceState::Loading => "⏳",
            ResourceState::Ready => "🔔",
            ResourceState::Failed(_) => "❌",
            ResourceState::Playing => "🔊",
        }
    }
}

impl std::fmt::Display for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceState::Unloaded => "UNLOADED",
            ResourceState::Loading => "LOADING",
            ResourceState::Ready => "READY",
            ResourceState::Failed(_) => "FAILED",
            ResourceState::Playing => "PLAYING",
        };
        write!(f, "{}", name)
    }
}
