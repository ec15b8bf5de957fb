//! Drowse Core - Signal extraction and temporal state machines
//!
//! This crate turns per-frame facial landmarks into eye and mouth aspect ratios
//! and turns streams of those ratios into debounced events: blinks, yawns, and
//! the sustained-closure "asleep" alarm.

pub mod domain;
pub mod ports;
pub mod session;
pub mod trackers;

pub use domain::{
    EyeReading, FaceGeometry, FrameReport, FrameSize, LandmarkFrame, LandmarkSet, MouthReading,
    NormalizedPoint, PixelPoint, Record, SessionSummary, Status, REQUIRED_LANDMARKS,
};
pub use ports::{LandmarkSource, ProgressEvent, ProgressSink, ReportOutput};
pub use session::{blinks_per_minute, frames_per_second, Session, SessionConfig};
pub use trackers::{EyeConfig, EyeStateTracker, MouthConfig, MouthStateTracker};
