//! Test support utilities for drowse.
//!
//! Provides mocks, synthetic face builders, and recording helpers for testing
//! the detection pipeline.
//!
//! # Example
//!
//! ```
//! use drowse_test_support::{MockLandmarkSource, SyntheticFaceBuilder, SyntheticRecording};
//!
//! // One second awake, then two seconds with eyes closed, at 30 fps
//! let recording = SyntheticRecording::new(30.0)
//!     .hold(&SyntheticFaceBuilder::awake(), 30)
//!     .hold(&SyntheticFaceBuilder::eyes_closed(), 60);
//!
//! let source = MockLandmarkSource::new(recording.frames());
//! ```

mod builders;
mod mocks;

pub use builders::{SyntheticFaceBuilder, SyntheticRecording};
pub use mocks::{MockLandmarkSource, MockProgressSink, MockReportOutput};
