//! Core domain types for landmark-based drowsiness detection.

mod geometry;
mod landmarks;
mod report;

pub use geometry::{
    ids, EyeGeometry, FaceGeometry, MouthGeometry, Overlay, REQUIRED_LANDMARKS,
};
pub use landmarks::{FrameSize, LandmarkFrame, LandmarkSet, NormalizedPoint, PixelPoint};
pub use report::{EyeReading, FrameReport, MouthReading, Record, SessionSummary, Status};
