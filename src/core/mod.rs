//! Core modules for Vigil

pub mod audio;
pub mod debounce;
pub mod engine;
#[cfg(feature = "playback")]
pub mod playback;
pub mod session;

pub mod api;

pub use audio::{AudioBackend, AudioController, BellBackend, TriggerOutcome};
pub use debounce::DebounceFilter;
pub use engine::AlertEngine;
#[cfg(feature = "playback")]
pub use playback::RodioBackend;
pub use session::{
    AudioWarning, CameraAccess, MonitorSession, PermissionStatus, SimulatedCamera, StartReport,
    StatusUpdate,
};

pub use api::{create_router, run_server};
