//! Debounced eye-state verdicts

use serde::{Deserialize, Serialize};

/// Outcome of feeding one observation through the debounce filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Most recent frame shows open eyes
    Open,
    /// All of the last N frames show closed eyes
    Closed,
    /// Fewer than N frames buffered, or no face in the frame
    Insufficient,
}

impl Verdict {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            Verdict::Open => "\x1b[32m",         // Green
            Verdict::Closed => "\x1b[31m",       // Red
            Verdict::Insufficient => "\x1b[90m", // Gray
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for verdict
    pub fn emoji(&self) -> &'static str {
        match self {
            Verdict::Open => "👁",
            Verdict::Closed => "😴",
            Verdict::Insufficient => "⏳",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Verdict::Open => "OPEN",
            Verdict::Closed => "CLOSED",
            Verdict::Insufficient => "INSUFFICIENT",
        };
        write!(f, "{}", name)
    }
}
