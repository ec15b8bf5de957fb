//! Synthetic landmark builders for testing.

use drowse_core::domain::{ids, FrameSize, LandmarkFrame, LandmarkSet, NormalizedPoint};
use serde_json::{json, Map, Value};

/// Horizontal eye width in pixels.
const EYE_WIDTH: f64 = 40.0;
/// Horizontal mouth width in pixels.
const MOUTH_WIDTH: f64 = 100.0;
/// Lip midpoint widening applied by the default mouth configuration.
const LIP_MARGIN: f64 = 5.0;

/// Builder for synthetic faces with chosen aspect ratios.
///
/// Geometry is laid out in pixel space and normalized to the frame, so the
/// trackers see exactly the requested EAR, MAR and lip gap (up to float
/// rounding). The mouth uses a 100 px width; since the MAR widens the lip
/// midpoints by 5 px on each side, the smallest reachable MAR is 0.1.
#[derive(Debug, Clone)]
pub struct SyntheticFaceBuilder {
    size: FrameSize,
    ear: f64,
    mar: f64,
    lip_gap: f64,
    omit: Vec<u32>,
}

impl Default for SyntheticFaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticFaceBuilder {
    /// An alert face on a 640x480 frame: EAR 0.3, MAR 0.3, 10 px lip gap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            size: FrameSize::new(640, 480),
            ear: 0.3,
            mar: 0.3,
            lip_gap: 10.0,
            omit: Vec::new(),
        }
    }

    // === Presets ===

    /// Open eyes, closed mouth.
    #[must_use]
    pub fn awake() -> Self {
        Self::new()
    }

    /// Eyes below the default closure threshold.
    #[must_use]
    pub fn eyes_closed() -> Self {
        Self::new().ear(0.15)
    }

    /// Mouth wide enough to count as a yawn.
    #[must_use]
    pub fn yawning() -> Self {
        Self::new().mar(0.8).lip_gap(40.0)
    }

    // === Settings ===

    /// Sets the frame size.
    #[must_use]
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = FrameSize::new(width, height);
        self
    }

    /// Sets the eye aspect ratio of both eyes.
    #[must_use]
    pub fn ear(mut self, ear: f64) -> Self {
        self.ear = ear;
        self
    }

    /// Sets the mouth aspect ratio (at least 0.1).
    #[must_use]
    pub fn mar(mut self, mar: f64) -> Self {
        self.mar = mar;
        self
    }

    /// Sets the vertical gap between the lip contours, in pixels.
    #[must_use]
    pub fn lip_gap(mut self, gap: f64) -> Self {
        self.lip_gap = gap;
        self
    }

    /// Leaves a landmark out of the generated set.
    #[must_use]
    pub fn without(mut self, id: u32) -> Self {
        self.omit.push(id);
        self
    }

    /// The configured frame size.
    #[must_use]
    pub const fn frame_size(&self) -> FrameSize {
        self.size
    }

    // === Output ===

    /// Builds the landmark set, including the overlay-only lip outline.
    #[must_use]
    pub fn landmarks(&self) -> LandmarkSet {
        let mut set = LandmarkSet::new();
        for (id, x, y) in self.pixel_layout() {
            if !self.omit.contains(&id) {
                set.insert(id, self.normalize(x, y));
            }
        }
        set
    }

    /// Builds a frame at session time `timestamp`.
    #[must_use]
    pub fn frame(&self, timestamp: f64) -> LandmarkFrame {
        LandmarkFrame::new(timestamp, self.size, self.landmarks())
    }

    /// Serializes the face as one recording line.
    #[must_use]
    pub fn to_json_line(&self, timestamp: Option<f64>) -> String {
        let mut landmarks = Map::new();
        for (id, x, y) in self.pixel_layout() {
            if self.omit.contains(&id) {
                continue;
            }
            let p = self.normalize(x, y);
            landmarks.insert(id.to_string(), json!([p.x, p.y]));
        }
        let mut record = json!({
            "width": self.size.width,
            "height": self.size.height,
            "landmarks": Value::Object(landmarks),
        });
        if let (Some(t), Some(obj)) = (timestamp, record.as_object_mut()) {
            obj.insert("t".into(), json!(t));
        }
        record.to_string()
    }

    fn normalize(&self, x: f64, y: f64) -> NormalizedPoint {
        NormalizedPoint::new(
            x / f64::from(self.size.width),
            y / f64::from(self.size.height),
        )
    }

    /// Pixel positions for every landmark the builder emits.
    fn pixel_layout(&self) -> Vec<(u32, f64, f64)> {
        let w = f64::from(self.size.width);
        let h = f64::from(self.size.height);
        let mut out = Vec::with_capacity(64);

        // Eyes: corners EYE_WIDTH apart, lids at +-half so EAR = half / 20.
        let half = self.ear * EYE_WIDTH / 2.0;
        let eye_y = h * 0.4;
        for (eye_ids, x0) in [(ids::RIGHT_EYE, w * 0.35), (ids::LEFT_EYE, w * 0.55)] {
            let [outer, up1, up2, inner, low2, low1] = eye_ids;
            out.push((outer, x0, eye_y));
            out.push((up1, x0 + 13.0, eye_y - half));
            out.push((up2, x0 + 27.0, eye_y - half));
            out.push((inner, x0 + EYE_WIDTH, eye_y));
            out.push((low2, x0 + 27.0, eye_y + half));
            out.push((low1, x0 + 13.0, eye_y + half));
        }

        // Mouth: MAR = (opening + 2 * margin) / width.
        let mouth_x = w * 0.5;
        let mouth_y = h * 0.7;
        let opening = (self.mar * MOUTH_WIDTH - 2.0 * LIP_MARGIN).max(0.0);
        out.push((ids::MOUTH_TOP, mouth_x, mouth_y - opening / 2.0));
        out.push((ids::MOUTH_BOTTOM, mouth_x, mouth_y + opening / 2.0));
        out.push((ids::MOUTH_LEFT, mouth_x - MOUTH_WIDTH / 2.0, mouth_y));
        out.push((ids::MOUTH_RIGHT, mouth_x + MOUTH_WIDTH / 2.0, mouth_y));

        let step = MOUTH_WIDTH / 9.0;
        for (i, (&upper, &lower)) in ids::UPPER_LIP.iter().zip(&ids::LOWER_LIP).enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let x = mouth_x - MOUTH_WIDTH / 2.0 + step * i as f64;
            out.push((upper, x, mouth_y - self.lip_gap / 2.0));
            out.push((lower, x, mouth_y + self.lip_gap / 2.0));
        }

        // Remaining outline points sit on the mouth line; they only feed overlays.
        for &id in &ids::LIP_OUTLINE {
            if !out.iter().any(|&(seen, _, _)| seen == id) {
                out.push((id, mouth_x, mouth_y));
            }
        }

        out
    }
}

/// A sequence of synthetic faces sampled at a fixed frame rate.
#[derive(Debug, Clone)]
pub struct SyntheticRecording {
    fps: f64,
    faces: Vec<SyntheticFaceBuilder>,
}

impl SyntheticRecording {
    /// Starts an empty recording at `fps` frames per second.
    #[must_use]
    pub const fn new(fps: f64) -> Self {
        Self {
            fps,
            faces: Vec::new(),
        }
    }

    /// Appends `count` frames of the same face.
    #[must_use]
    pub fn hold(mut self, face: &SyntheticFaceBuilder, count: usize) -> Self {
        self.faces.extend(std::iter::repeat(face.clone()).take(count));
        self
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Returns true if the recording has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Session time of frame `index`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn timestamp(&self, index: usize) -> f64 {
        index as f64 / self.fps
    }

    /// Builds all frames, the first at t = 0.
    #[must_use]
    pub fn frames(&self) -> Vec<LandmarkFrame> {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, face)| face.frame(self.timestamp(i)))
            .collect()
    }

    /// Serializes the recording as JSON Lines, optionally without timestamps.
    #[must_use]
    pub fn to_jsonl(&self, timestamps: bool) -> String {
        let mut out = String::new();
        for (i, face) in self.faces.iter().enumerate() {
            let t = timestamps.then(|| self.timestamp(i));
            out.push_str(&face.to_json_line(t));
            out.push('\n');
        }
        out
    }
}
