//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the detection core and external adapters.

mod landmark_source;
mod progress;
mod report_output;

pub use landmark_source::LandmarkSource;
pub use progress::{ProgressEvent, ProgressSink};
pub use report_output::ReportOutput;
