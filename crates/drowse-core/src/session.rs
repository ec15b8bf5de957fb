//! Session aggregation: drives both trackers over a stream of frames.

use anyhow::{bail, Result};
use tracing::debug;

use crate::domain::{
    FaceGeometry, FrameReport, LandmarkFrame, SessionSummary, Status, REQUIRED_LANDMARKS,
};
use crate::trackers::{EyeConfig, EyeStateTracker, MouthConfig, MouthStateTracker};

/// Configuration for a detection session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionConfig {
    /// Eye tracker settings.
    pub eyes: EyeConfig,
    /// Mouth tracker settings.
    pub mouth: MouthConfig,
    /// Attach contour polygons to every frame report.
    pub overlay: bool,
}

/// One face followed over one continuous stream of frames.
#[derive(Debug, Clone)]
pub struct Session {
    overlay: bool,
    eyes: EyeStateTracker,
    mouth: MouthStateTracker,
    frames: u64,
    skipped: u64,
    elapsed: f64,
    alarms: u32,
    alarm_active: bool,
    longest_closure: f64,
}

impl Session {
    /// Starts a session with fresh trackers.
    #[must_use]
    pub const fn new(config: SessionConfig) -> Self {
        Self {
            overlay: config.overlay,
            eyes: EyeStateTracker::new(config.eyes),
            mouth: MouthStateTracker::new(config.mouth),
            frames: 0,
            skipped: 0,
            elapsed: 0.0,
            alarms: 0,
            alarm_active: false,
            longest_closure: 0.0,
        }
    }

    /// Processes one frame through both trackers.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame lacks any required landmark. The frame is
    /// counted as skipped and tracker state is left untouched.
    pub fn process(&mut self, frame: &LandmarkFrame) -> Result<FrameReport> {
        let index = self.frames + self.skipped;
        let face = match extract(frame) {
            Ok(face) => face,
            Err(e) => {
                self.skipped += 1;
                return Err(e);
            }
        };

        let now = frame.timestamp;
        let eyes = self.eyes.update(&face, now);
        let mouth = self.mouth.update(&face, now);

        self.frames += 1;
        self.elapsed = now;
        if eyes.alarm && !self.alarm_active {
            self.alarms += 1;
        }
        self.alarm_active = eyes.alarm;
        if let Some(closed_for) = eyes.closed_for {
            self.longest_closure = self.longest_closure.max(closed_for);
        }

        Ok(FrameReport {
            index,
            timestamp: now,
            status: Status::from_readings(&eyes, &mouth),
            eyes,
            mouth,
            blinks_per_minute: blinks_per_minute(eyes.blinks, now),
            fps: frames_per_second(self.frames, now),
            overlay: self.overlay.then(|| face.overlay()),
        })
    }

    /// Counts a frame that was rejected before reaching the trackers.
    pub fn skip(&mut self, reason: &str) {
        debug!(index = self.frames + self.skipped, reason, "Skipping frame");
        self.skipped += 1;
    }

    /// Frames processed so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames skipped so far.
    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Times the asleep alarm has gone up.
    #[must_use]
    pub const fn alarms(&self) -> u32 {
        self.alarms
    }

    /// The eye tracker.
    #[must_use]
    pub const fn eyes(&self) -> &EyeStateTracker {
        &self.eyes
    }

    /// Totals for the session so far.
    #[must_use]
    pub fn summary(&self, source: impl Into<String>) -> SessionSummary {
        SessionSummary {
            source: source.into(),
            finished_at: None,
            frames: self.frames,
            skipped: self.skipped,
            elapsed: self.elapsed,
            blinks: self.eyes.blinks(),
            yawns: self.mouth.yawns(),
            alarms: self.alarms,
            longest_closure: self.longest_closure,
            blinks_per_minute: blinks_per_minute(self.eyes.blinks(), self.elapsed),
            fps: frames_per_second(self.frames, self.elapsed),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

fn extract(frame: &LandmarkFrame) -> Result<FaceGeometry> {
    let missing = frame.landmarks.missing(&REQUIRED_LANDMARKS);
    if !missing.is_empty() {
        bail!(
            "frame at {:.3}s is missing {} landmark(s): {missing:?}",
            frame.timestamp,
            missing.len()
        );
    }
    FaceGeometry::extract(&frame.landmarks, frame.size)
}

/// Blinks per minute over `elapsed` seconds; 0 until time has passed.
#[must_use]
pub fn blinks_per_minute(blinks: u32, elapsed: f64) -> f64 {
    if elapsed <= 0.0 {
        return 0.0;
    }
    f64::from(blinks) / elapsed * 60.0
}

/// Frames per second over `elapsed` seconds; 0 until time has passed.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn frames_per_second(frames: u64, elapsed: f64) -> f64 {
    if elapsed <= 0.0 {
        return 0.0;
    }
    frames as f64 / elapsed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::{FrameSize, LandmarkSet, NormalizedPoint};

    fn flat_frame(t: f64) -> LandmarkFrame {
        let landmarks: LandmarkSet = REQUIRED_LANDMARKS
            .iter()
            .map(|&id| (id, NormalizedPoint::new(0.5, 0.5)))
            .collect();
        LandmarkFrame::new(t, FrameSize::new(640, 480), landmarks)
    }

    #[test]
    fn test_rates_guard_zero_elapsed() {
        assert!(blinks_per_minute(4, 0.0).abs() < f64::EPSILON);
        assert!(blinks_per_minute(4, -1.0).abs() < f64::EPSILON);
        assert!(frames_per_second(10, 0.0).abs() < f64::EPSILON);
        assert!((blinks_per_minute(4, 30.0) - 8.0).abs() < 1e-9);
        assert!((frames_per_second(300, 10.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_coincident_points_never_fail() {
        let mut session = Session::default();
        let report = session.process(&flat_frame(0.5)).unwrap();
        assert!(report.mouth.mar.abs() < f64::EPSILON);
        assert!(report.mouth.vertical_gap.abs() < f64::EPSILON);
        assert!(!report.mouth.open);
        assert!(report.eyes.ear.abs() < f64::EPSILON);
        assert!(report.overlay.is_none());
    }

    #[test]
    fn test_missing_landmarks_skip_frame() {
        let mut session = Session::default();
        let mut frame = flat_frame(0.1);
        frame.landmarks = LandmarkSet::new();
        let err = session.process(&frame).unwrap_err();
        assert!(err.to_string().contains("missing 36 landmark(s)"));
        assert_eq!(session.skipped(), 1);
        assert_eq!(session.frames(), 0);
        assert_eq!(session.eyes().closed_frames(), 0);

        let report = session.process(&flat_frame(0.2)).unwrap();
        assert_eq!(report.index, 1);
    }

    #[test]
    fn test_summary_counts_alarm_edges() {
        let mut session = Session::default();
        // flat geometry reads as closed eyes
        for frame in 1..=60 {
            session.process(&flat_frame(f64::from(frame) / 30.0)).unwrap();
        }
        session.skip("unreadable line");
        let summary = session.summary("test");
        assert_eq!(summary.frames, 60);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.alarms, 1);
        assert!((summary.longest_closure - 59.0 / 30.0).abs() < 1e-9);
        assert!((summary.elapsed - 2.0).abs() < 1e-9);
        assert!((summary.fps - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlay_attached_when_enabled() {
        let mut session = Session::new(SessionConfig {
            overlay: true,
            ..SessionConfig::default()
        });
        let report = session.process(&flat_frame(0.0)).unwrap();
        let overlay = report.overlay.unwrap();
        assert_eq!(overlay.right_eye.len(), 6);
    }
}
