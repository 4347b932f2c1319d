//! Error taxonomy
//!
//! None of these are fatal to the process; every failure degrades to a
//! visible status flag so the alert system stays usable.

use thiserror::Error;

/// Errors surfaced by the monitoring core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// Camera permission was not granted; monitoring cannot start
    #[error("camera permission denied")]
    PermissionDenied,

    /// No usable camera device exists; monitoring cannot start
    #[error("no camera device available")]
    DetectorUnavailable,

    /// The alert sound could not be loaded
    #[error("alert sound failed to load: {0}")]
    AudioLoadFailed(String),

    /// A playback attempt failed; the resource is presumed still loaded
    #[error("alert playback failed: {0}")]
    AudioPlaybackFailed(String),
}
