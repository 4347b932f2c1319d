//! Core types for Vigil

mod sample;
mod verdict;
mod state;
mod output;
mod status;
mod config;
mod error;

pub use sample::{EyeStateSample, FrameObservation};
pub use verdict::Verdict;
pub use state::{MonitoringState, ResourceState};
pub use output::{AlertDecision, FrameOutput};
pub use status::MonitorStatus;
pub use config::{FaceLossPolicy, MonitorConfig};
pub use error::MonitorError;
