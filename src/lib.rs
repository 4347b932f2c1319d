//! Vigil: drowsiness alerts from eye-openness samples
//!
//! Data path: EyeStateSample → DebounceFilter → AlertEngine → AudioController

pub mod core;
pub mod types;

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Eye-openness probability below which a frame counts as closed.
/// Both eyes must be under this for the frame to count.
pub const EYE_CLOSED_THRESHOLD: f64 = 0.2;

/// Consecutive closed frames required for a CLOSED verdict
/// 3 frames at the target rate is ~600ms of closure - long enough to
/// filter blinks, short enough to catch a nod-off
pub const DEBOUNCE_WINDOW_FRAMES: usize = 3;

/// Minimum interval between alert triggers (milliseconds)
pub const ALERT_COOLDOWN_MS: u64 = 3000;

/// Design-target sample delivery rate (frames per second).
/// The external detector owns the actual rate; this is what the
/// simulator paces at and what the debounce defaults are tuned for.
pub const TARGET_SAMPLE_RATE_HZ: u32 = 5;

// =============================================================================
// CHANNELS
// =============================================================================

/// Capacity of the live status broadcast channel
pub const UPDATE_CHANNEL_CAPACITY: usize = 100;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
