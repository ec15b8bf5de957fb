//! Eye and mouth geometry extracted from a landmark set.
//!
//! Landmark IDs follow the 468-point face mesh topology. All distances are
//! computed after denormalizing to pixel space, so ratios are independent of
//! the frame aspect.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::{FrameSize, LandmarkSet, PixelPoint};

/// Fixed landmark index maps.
pub mod ids {
    /// Left eye: outer corner, upper lid (2), inner corner, lower lid (2).
    pub const LEFT_EYE: [u32; 6] = [362, 385, 387, 263, 373, 380];
    /// Right eye, same ordering as [`LEFT_EYE`].
    pub const RIGHT_EYE: [u32; 6] = [33, 160, 158, 133, 153, 144];

    /// Inner upper lip midpoint.
    pub const MOUTH_TOP: u32 = 13;
    /// Inner lower lip midpoint.
    pub const MOUTH_BOTTOM: u32 = 14;
    /// Left mouth corner.
    pub const MOUTH_LEFT: u32 = 78;
    /// Right mouth corner.
    pub const MOUTH_RIGHT: u32 = 308;

    /// Upper lip contour used for the vertical gap measurement.
    pub const UPPER_LIP: [u32; 10] = [61, 185, 40, 39, 37, 0, 267, 269, 270, 409];
    /// Lower lip contour used for the vertical gap measurement.
    pub const LOWER_LIP: [u32; 10] = [146, 91, 181, 84, 17, 314, 405, 321, 375, 291];

    /// Closed lip outline for overlays. Not needed for any metric.
    pub const LIP_OUTLINE: [u32; 35] = [
        61, 185, 40, 39, 37, 0, 267, 269, 270, 409, 291, 308, 415, 310, 311, 312, 13, 82, 81, 80,
        191, 78, 62, 76, 77, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291,
    ];
}

/// Every landmark ID the metrics read, sorted.
pub const REQUIRED_LANDMARKS: [u32; 36] = [
    0, 13, 14, 17, 33, 37, 39, 40, 61, 78, 84, 91, 133, 144, 146, 153, 158, 160, 181, 185, 263,
    267, 269, 270, 291, 308, 314, 321, 362, 373, 375, 380, 385, 387, 405, 409,
];

/// Six ordered eye contour points in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeGeometry {
    points: [PixelPoint; 6],
}

impl EyeGeometry {
    /// Creates eye geometry from points ordered outer corner, upper lid 1,
    /// upper lid 2, inner corner, lower lid 2, lower lid 1.
    #[must_use]
    pub const fn new(points: [PixelPoint; 6]) -> Self {
        Self { points }
    }

    /// The contour points in their canonical order.
    #[must_use]
    pub const fn points(&self) -> &[PixelPoint; 6] {
        &self.points
    }

    /// Eye aspect ratio: `(|p1-p5| + |p2-p4|) / (2 |p0-p3|)`.
    ///
    /// Returns 0 when the corners coincide.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        let [p0, p1, p2, p3, p4, p5] = self.points;
        let horizontal = p0.distance(p3);
        if horizontal <= 0.0 {
            return 0.0;
        }
        (p1.distance(p5) + p2.distance(p4)) / (2.0 * horizontal)
    }
}

/// Mouth extremes plus upper and lower lip contours in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouthGeometry {
    /// Inner upper lip midpoint.
    pub top: PixelPoint,
    /// Inner lower lip midpoint.
    pub bottom: PixelPoint,
    /// Left corner.
    pub left: PixelPoint,
    /// Right corner.
    pub right: PixelPoint,
    /// Upper lip contour.
    pub upper_lip: [PixelPoint; 10],
    /// Lower lip contour.
    pub lower_lip: [PixelPoint; 10],
}

impl MouthGeometry {
    /// Mouth aspect ratio.
    ///
    /// The vertical opening is the larger of the direct top-bottom distance and
    /// the same distance with top moved up and bottom moved down by
    /// `margin_px`. Landmark jitter near lip contact understates the opening, the
    /// widened variant bounds it from below. Returns 0 when the corners coincide.
    #[must_use]
    pub fn aspect_ratio(&self, margin_px: f64) -> f64 {
        let direct = self.top.distance(self.bottom);
        let widened = self
            .top
            .shifted_y(-margin_px)
            .distance(self.bottom.shifted_y(margin_px));
        let vertical = direct.max(widened);
        let horizontal = self.left.distance(self.right);
        if horizontal <= 0.0 {
            return 0.0;
        }
        vertical / horizontal
    }

    /// Absolute difference between mean upper-lip and mean lower-lip y, in pixels.
    #[must_use]
    pub fn vertical_gap(&self) -> f64 {
        (mean_y(&self.upper_lip) - mean_y(&self.lower_lip)).abs()
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean_y(points: &[PixelPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.y).sum::<f64>() / points.len() as f64
}

/// Closed polygons for drawing on top of the frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Left eye contour.
    pub left_eye: Vec<PixelPoint>,
    /// Right eye contour.
    pub right_eye: Vec<PixelPoint>,
    /// Lip outline. Points the detector did not supply are left out.
    pub lips: Vec<PixelPoint>,
}

/// All geometry needed by the trackers for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceGeometry {
    /// Left eye.
    pub left_eye: EyeGeometry,
    /// Right eye.
    pub right_eye: EyeGeometry,
    /// Mouth.
    pub mouth: MouthGeometry,
    lip_outline: Vec<PixelPoint>,
}

impl FaceGeometry {
    /// Builds face geometry from already-denormalized parts.
    #[must_use]
    pub const fn new(left_eye: EyeGeometry, right_eye: EyeGeometry, mouth: MouthGeometry) -> Self {
        Self {
            left_eye,
            right_eye,
            mouth,
            lip_outline: Vec::new(),
        }
    }

    /// Extracts geometry from a landmark set.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first required landmark that is absent.
    pub fn extract(landmarks: &LandmarkSet, size: FrameSize) -> Result<Self> {
        let left_eye = EyeGeometry::new(pick(landmarks, &ids::LEFT_EYE, size)?);
        let right_eye = EyeGeometry::new(pick(landmarks, &ids::RIGHT_EYE, size)?);

        let [top, bottom, left, right] = pick(
            landmarks,
            &[
                ids::MOUTH_TOP,
                ids::MOUTH_BOTTOM,
                ids::MOUTH_LEFT,
                ids::MOUTH_RIGHT,
            ],
            size,
        )?;
        let mouth = MouthGeometry {
            top,
            bottom,
            left,
            right,
            upper_lip: pick(landmarks, &ids::UPPER_LIP, size)?,
            lower_lip: pick(landmarks, &ids::LOWER_LIP, size)?,
        };

        let lip_outline = ids::LIP_OUTLINE
            .iter()
            .filter_map(|&id| landmarks.pixel(id, size))
            .collect();

        Ok(Self {
            left_eye,
            right_eye,
            mouth,
            lip_outline,
        })
    }

    /// Mean of the left and right eye aspect ratios.
    #[must_use]
    pub fn eye_aspect_ratio(&self) -> f64 {
        (self.left_eye.aspect_ratio() + self.right_eye.aspect_ratio()) / 2.0
    }

    /// Pass-through polygons for rendering.
    #[must_use]
    pub fn overlay(&self) -> Overlay {
        Overlay {
            left_eye: self.left_eye.points().to_vec(),
            right_eye: self.right_eye.points().to_vec(),
            lips: self.lip_outline.clone(),
        }
    }
}

fn pick<const N: usize>(
    landmarks: &LandmarkSet,
    ids: &[u32; N],
    size: FrameSize,
) -> Result<[PixelPoint; N]> {
    let mut out = [PixelPoint::default(); N];
    for (slot, &id) in out.iter_mut().zip(ids) {
        *slot = landmarks
            .pixel(id, size)
            .ok_or_else(|| anyhow!("missing landmark {id}"))?;
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::NormalizedPoint;

    fn px(x: f64, y: f64) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    fn open_eye() -> EyeGeometry {
        // 40 px wide, lids 6 px above and below the corner line
        EyeGeometry::new([
            px(100.0, 100.0),
            px(113.0, 94.0),
            px(127.0, 94.0),
            px(140.0, 100.0),
            px(127.0, 106.0),
            px(113.0, 106.0),
        ])
    }

    #[test]
    fn test_eye_aspect_ratio() {
        let ear = open_eye().aspect_ratio();
        assert!((ear - 0.3).abs() < 1e-9, "got {ear}");
    }

    #[test]
    fn test_degenerate_eye_is_zero() {
        let eye = EyeGeometry::new([px(50.0, 50.0); 6]);
        assert!(eye.aspect_ratio().abs() < f64::EPSILON);
    }

    #[test]
    fn test_mouth_uses_widened_vertical_when_lips_touch() {
        let mouth = MouthGeometry {
            top: px(100.0, 100.0),
            bottom: px(100.0, 100.0),
            left: px(80.0, 100.0),
            right: px(120.0, 100.0),
            upper_lip: [px(100.0, 95.0); 10],
            lower_lip: [px(100.0, 105.0); 10],
        };
        // direct distance is 0, widened is 10 px over a 40 px width
        assert!((mouth.aspect_ratio(5.0) - 0.25).abs() < 1e-9);
        assert!((mouth.vertical_gap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_mouth_uses_direct_vertical_when_wide_open() {
        let mouth = MouthGeometry {
            top: px(100.0, 80.0),
            bottom: px(100.0, 120.0),
            left: px(75.0, 100.0),
            right: px(125.0, 100.0),
            upper_lip: [px(100.0, 75.0); 10],
            lower_lip: [px(100.0, 125.0); 10],
        };
        // widened distance 50 px beats direct 40 px
        assert!((mouth.aspect_ratio(5.0) - 1.0).abs() < 1e-9);
        assert!((mouth.aspect_ratio(0.0) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_mouth_is_zero() {
        let p = px(10.0, 10.0);
        let mouth = MouthGeometry {
            top: p,
            bottom: p,
            left: p,
            right: p,
            upper_lip: [p; 10],
            lower_lip: [p; 10],
        };
        assert!(mouth.aspect_ratio(5.0).abs() < f64::EPSILON);
        assert!(mouth.vertical_gap().abs() < f64::EPSILON);
    }

    #[test]
    fn test_required_landmarks_cover_metrics() {
        let mut all: Vec<u32> = ids::LEFT_EYE
            .iter()
            .chain(&ids::RIGHT_EYE)
            .chain(&ids::UPPER_LIP)
            .chain(&ids::LOWER_LIP)
            .chain(&[
                ids::MOUTH_TOP,
                ids::MOUTH_BOTTOM,
                ids::MOUTH_LEFT,
                ids::MOUTH_RIGHT,
            ])
            .copied()
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all, REQUIRED_LANDMARKS.to_vec());
    }

    #[test]
    fn test_extract_reports_missing_landmark() {
        let landmarks: LandmarkSet = REQUIRED_LANDMARKS
            .iter()
            .filter(|&&id| id != 387)
            .map(|&id| (id, NormalizedPoint::new(0.5, 0.5)))
            .collect();
        let err = FaceGeometry::extract(&landmarks, FrameSize::new(640, 480)).unwrap_err();
        assert!(err.to_string().contains("387"));
    }

    #[test]
    fn test_extract_denormalizes() {
        let landmarks: LandmarkSet = REQUIRED_LANDMARKS
            .iter()
            .map(|&id| (id, NormalizedPoint::new(0.5, 0.25)))
            .collect();
        let face = FaceGeometry::extract(&landmarks, FrameSize::new(640, 480)).expect("extract");
        assert_eq!(face.mouth.top, px(320.0, 120.0));
        // outline keeps only the IDs that were supplied
        let overlay = face.overlay();
        assert_eq!(overlay.left_eye.len(), 6);
        assert!(!overlay.lips.is_empty());
        assert!(overlay.lips.len() < ids::LIP_OUTLINE.len());
    }
}
