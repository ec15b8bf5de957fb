//! Per-frame readings and session summaries.

use serde::{Deserialize, Serialize};

use super::Overlay;

/// Eye tracker state after one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EyeReading {
    /// Mean eye aspect ratio of both eyes.
    pub ear: f64,
    /// Left eye aspect ratio, when computed from geometry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_ear: Option<f64>,
    /// Right eye aspect ratio, when computed from geometry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_ear: Option<f64>,
    /// Consecutive frames with eyes below the closure threshold.
    pub closed_frames: u32,
    /// Seconds since the current closure started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_for: Option<f64>,
    /// Seconds since the asleep alarm went up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asleep_for: Option<f64>,
    /// Whether the asleep alarm is active.
    pub alarm: bool,
    /// Cumulative confirmed blinks.
    pub blinks: u32,
    /// A blink was confirmed on this frame.
    pub blink_detected: bool,
}

/// Mouth tracker state after one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MouthReading {
    /// Mouth aspect ratio.
    pub mar: f64,
    /// Vertical gap between the lip contours, in pixels.
    pub vertical_gap: f64,
    /// Mouth-open condition holds on this frame.
    pub open: bool,
    /// A yawn episode is in progress.
    pub yawning: bool,
    /// The episode has lasted long enough to be a yawn.
    pub confirmed: bool,
    /// Seconds since the episode started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yawn_duration: Option<f64>,
    /// Cumulative confirmed yawns.
    pub yawns: u32,
    /// A yawn was counted on this frame.
    pub yawn_detected: bool,
}

/// Overall operator state for one frame.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// No alarm and no confirmed yawn.
    #[default]
    Awake,
    /// A confirmed yawn is in progress.
    Yawning,
    /// The eyes have stayed closed past the asleep threshold.
    Asleep,
}

impl Status {
    /// Derives the status from both readings. The asleep alarm dominates.
    #[must_use]
    pub const fn from_readings(eyes: &EyeReading, mouth: &MouthReading) -> Self {
        if eyes.alarm {
            Self::Asleep
        } else if mouth.confirmed {
            Self::Yawning
        } else {
            Self::Awake
        }
    }
}

/// Everything the core produces for one processed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Index of the frame within its session (0-based, skipped frames included).
    pub index: u64,
    /// Elapsed session time in seconds.
    pub timestamp: f64,
    /// Overall state.
    pub status: Status,
    /// Eye tracker reading.
    pub eyes: EyeReading,
    /// Mouth tracker reading.
    pub mouth: MouthReading,
    /// Blinks per minute so far.
    pub blinks_per_minute: f64,
    /// Processed frames per second so far.
    pub fps: f64,
    /// Contour polygons, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Overlay>,
}

/// Totals for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Where the frames came from.
    pub source: String,
    /// When the session was summarized (RFC 3339), filled in by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    /// Frames processed.
    pub frames: u64,
    /// Frames skipped because of bad input.
    pub skipped: u64,
    /// Elapsed session time of the last processed frame, in seconds.
    pub elapsed: f64,
    /// Confirmed blinks.
    pub blinks: u32,
    /// Confirmed yawns.
    pub yawns: u32,
    /// Times the asleep alarm went up.
    pub alarms: u32,
    /// Longest eye closure observed, in seconds.
    pub longest_closure: f64,
    /// Blinks per minute over the session.
    pub blinks_per_minute: f64,
    /// Processed frames per second over the session.
    pub fps: f64,
}

/// One line of report output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    /// A processed frame.
    Frame(FrameReport),
    /// End-of-session totals.
    Summary(SessionSummary),
}
