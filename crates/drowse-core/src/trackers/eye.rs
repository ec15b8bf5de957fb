//! Blink and microsleep detection from the eye aspect ratio.

use std::time::Duration;

use tracing::{debug, info};

use super::reached;
use crate::domain::{EyeReading, FaceGeometry};

/// Configuration for the eye tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeConfig {
    /// Eyes with a mean EAR below this value count as closed.
    pub closure_threshold: f64,
    /// Minimum closure, measured at the reopening frame, that counts as a blink.
    pub min_blink: Duration,
    /// Closure length after which the asleep alarm goes up.
    pub asleep_after: Duration,
}

impl EyeConfig {
    /// Frame rate the frame-count defaults were tuned for.
    pub const REFERENCE_FPS: f64 = 30.0;
    /// Default minimum blink length in frames at the reference rate.
    pub const DEFAULT_BLINK_FRAMES: u32 = 3;
    /// Default asleep threshold in consecutive closed frames at the reference rate.
    pub const DEFAULT_ASLEEP_FRAMES: u32 = 50;
    /// Default closure threshold.
    pub const DEFAULT_CLOSURE_THRESHOLD: f64 = 0.20;

    /// Derives wall-clock thresholds from frame counts at a given frame rate.
    ///
    /// A blink of `blink_frames` closed frames is judged on the first open
    /// frame, `blink_frames` intervals after the closure began. The asleep
    /// alarm is judged on the `asleep_frames`-th closed frame, one interval
    /// earlier relative to its own count. A non-positive `fps` falls back to
    /// [`Self::REFERENCE_FPS`].
    #[must_use]
    pub fn from_frame_counts(fps: f64, blink_frames: u32, asleep_frames: u32) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            Self::REFERENCE_FPS
        };
        let asleep_intervals = f64::from(asleep_frames.saturating_sub(1));
        Self {
            closure_threshold: Self::DEFAULT_CLOSURE_THRESHOLD,
            min_blink: seconds(f64::from(blink_frames) / fps),
            asleep_after: seconds(asleep_intervals / fps),
        }
    }

    /// Sets the closure threshold.
    #[must_use]
    pub fn with_closure_threshold(mut self, threshold: f64) -> Self {
        self.closure_threshold = threshold;
        self
    }
}

fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

impl Default for EyeConfig {
    fn default() -> Self {
        Self::from_frame_counts(
            Self::REFERENCE_FPS,
            Self::DEFAULT_BLINK_FRAMES,
            Self::DEFAULT_ASLEEP_FRAMES,
        )
    }
}

/// Tracks eye closure over time.
///
/// Short closures followed by reopening count as blinks; a closure lasting
/// past [`EyeConfig::asleep_after`] raises the alarm until the eyes reopen.
#[derive(Debug, Clone)]
pub struct EyeStateTracker {
    config: EyeConfig,
    closed_frames: u32,
    blinks: u32,
    closure_start: Option<f64>,
    alarm_start: Option<f64>,
}

impl EyeStateTracker {
    /// Creates a tracker with the given configuration.
    #[must_use]
    pub const fn new(config: EyeConfig) -> Self {
        Self {
            config,
            closed_frames: 0,
            blinks: 0,
            closure_start: None,
            alarm_start: None,
        }
    }

    /// Cumulative confirmed blinks.
    #[must_use]
    pub const fn blinks(&self) -> u32 {
        self.blinks
    }

    /// Whether the asleep alarm is active.
    #[must_use]
    pub const fn alarm(&self) -> bool {
        self.alarm_start.is_some()
    }

    /// Consecutive closed frames so far.
    #[must_use]
    pub const fn closed_frames(&self) -> u32 {
        self.closed_frames
    }

    /// Computes the EAR of both eyes and advances the state machine.
    pub fn update(&mut self, face: &FaceGeometry, now: f64) -> EyeReading {
        let mut reading = self.observe(face.eye_aspect_ratio(), now);
        reading.left_ear = Some(face.left_eye.aspect_ratio());
        reading.right_ear = Some(face.right_eye.aspect_ratio());
        reading
    }

    /// Advances the state machine with a precomputed EAR at session time `now`.
    pub fn observe(&mut self, ear: f64, now: f64) -> EyeReading {
        let mut blink_detected = false;
        let mut closed_for = None;

        if ear < self.config.closure_threshold {
            self.closed_frames = self.closed_frames.saturating_add(1);
            let start = *self.closure_start.get_or_insert(now);
            let elapsed = now - start;
            closed_for = Some(elapsed);

            if self.alarm_start.is_none() && reached(elapsed, self.config.asleep_after) {
                info!(
                    closed_for = elapsed,
                    frames = self.closed_frames,
                    "Eyes closed past asleep threshold"
                );
                self.alarm_start = Some(now);
            }
        } else {
            if let Some(start) = self.closure_start {
                if reached(now - start, self.config.min_blink) {
                    self.blinks += 1;
                    blink_detected = true;
                    debug!(
                        duration = now - start,
                        frames = self.closed_frames,
                        total = self.blinks,
                        "Blink"
                    );
                }
            }
            if self.alarm_start.is_some() {
                info!("Eyes reopened, alarm cleared");
            }
            self.closed_frames = 0;
            self.closure_start = None;
            self.alarm_start = None;
        }

        EyeReading {
            ear,
            left_ear: None,
            right_ear: None,
            closed_frames: self.closed_frames,
            closed_for,
            asleep_for: self.alarm_start.map(|start| now - start),
            alarm: self.alarm(),
            blinks: self.blinks,
            blink_detected,
        }
    }

    /// Clears all state, including the blink count.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

impl Default for EyeStateTracker {
    fn default() -> Self {
        Self::new(EyeConfig::default())
    }
}
