//! Temporal state machines over per-frame aspect ratios.
//!
//! Each tracker is an owned struct mutated once per frame. Thresholds are
//! wall-clock durations measured on the caller-supplied session clock, so
//! behaviour does not depend on the camera frame rate.

mod eye;
mod mouth;

pub use eye::{EyeConfig, EyeStateTracker};
pub use mouth::{MouthConfig, MouthStateTracker};

use std::time::Duration;

/// Slack for comparing elapsed time against thresholds.
///
/// Timestamps derived from frame indices (`i / fps`) carry rounding error, and a
/// closure lasting exactly the threshold must still qualify.
const TIME_TOLERANCE: f64 = 1e-6;

/// Returns true once `elapsed` seconds reach `threshold`.
fn reached(elapsed: f64, threshold: Duration) -> bool {
    elapsed + TIME_TOLERANCE >= threshold.as_secs_f64()
}
