//! Yawn detection from the mouth aspect ratio and lip gap.

use std::time::Duration;

use tracing::{debug, info};

use super::reached;
use crate::domain::{FaceGeometry, MouthReading};

/// Configuration for the mouth tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouthConfig {
    /// The mouth counts as open only above this MAR.
    pub mar_threshold: f64,
    /// The mouth counts as open only above this lip gap, in pixels.
    ///
    /// MAR is scale-invariant but noisy when the face is small in frame; the
    /// absolute gap anchors it.
    pub min_gap_px: f64,
    /// How long the mouth must stay open for the episode to be a yawn.
    pub min_yawn: Duration,
    /// Vertical widening applied to the lip midpoints when computing MAR.
    pub lip_margin_px: f64,
}

impl Default for MouthConfig {
    fn default() -> Self {
        Self {
            mar_threshold: 0.6,
            min_gap_px: 30.0,
            min_yawn: Duration::from_millis(1500),
            lip_margin_px: 5.0,
        }
    }
}

/// Tracks mouth-open episodes and counts yawns.
///
/// Entry into an episode is immediate on the first open frame; the episode is
/// confirmed as a yawn once it has lasted [`MouthConfig::min_yawn`] and is
/// counted exactly once, however many frames it stays confirmed.
#[derive(Debug, Clone)]
pub struct MouthStateTracker {
    config: MouthConfig,
    yawn_start: Option<f64>,
    counted: bool,
    yawns: u32,
}

impl MouthStateTracker {
    /// Creates a tracker with the given configuration.
    #[must_use]
    pub const fn new(config: MouthConfig) -> Self {
        Self {
            config,
            yawn_start: None,
            counted: false,
            yawns: 0,
        }
    }

    /// Cumulative confirmed yawns.
    #[must_use]
    pub const fn yawns(&self) -> u32 {
        self.yawns
    }

    /// Whether a mouth-open episode is in progress.
    #[must_use]
    pub const fn yawning(&self) -> bool {
        self.yawn_start.is_some()
    }

    /// Computes MAR and lip gap and advances the state machine.
    pub fn update(&mut self, face: &FaceGeometry, now: f64) -> MouthReading {
        let mar = face.mouth.aspect_ratio(self.config.lip_margin_px);
        let gap = face.mouth.vertical_gap();
        self.observe(mar, gap, now)
    }

    /// Advances the state machine with precomputed MAR and lip gap at session time `now`.
    pub fn observe(&mut self, mar: f64, vertical_gap: f64, now: f64) -> MouthReading {
        let open = mar > self.config.mar_threshold && vertical_gap > self.config.min_gap_px;
        let mut confirmed = false;
        let mut yawn_detected = false;
        let mut yawn_duration = None;

        if open {
            match self.yawn_start {
                None => {
                    debug!(mar, vertical_gap, "Mouth opened");
                    self.yawn_start = Some(now);
                    yawn_duration = Some(0.0);
                }
                Some(start) => {
                    let duration = now - start;
                    yawn_duration = Some(duration);
                    if reached(duration, self.config.min_yawn) {
                        confirmed = true;
                        if !self.counted {
                            self.counted = true;
                            self.yawns += 1;
                            yawn_detected = true;
                            info!(duration, total = self.yawns, "Yawn");
                        }
                    }
                }
            }
        } else {
            self.yawn_start = None;
            self.counted = false;
        }

        MouthReading {
            mar,
            vertical_gap,
            open,
            yawning: self.yawning(),
            confirmed,
            yawn_duration,
            yawns: self.yawns,
            yawn_detected,
        }
    }

    /// Clears all state, including the yawn count.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }
}

impl Default for MouthStateTracker {
    fn default() -> Self {
        Self::new(MouthConfig::default())
    }
}
