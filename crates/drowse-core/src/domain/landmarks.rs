//! Per-frame landmark input types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A landmark position normalized to the frame, each axis in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPoint {
    /// Horizontal position as a fraction of frame width.
    pub x: f64,
    /// Vertical position as a fraction of frame height.
    pub y: f64,
}

impl NormalizedPoint {
    /// Creates a normalized point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Denormalizes into pixel space for the given frame size.
    #[must_use]
    pub fn to_pixel(self, size: FrameSize) -> PixelPoint {
        PixelPoint {
            x: self.x * f64::from(size.width),
            y: self.y * f64::from(size.height),
        }
    }
}

/// A point in pixel coordinates. Distances are measured in this space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Horizontal pixel position.
    pub x: f64,
    /// Vertical pixel position.
    pub y: f64,
}

impl PixelPoint {
    /// Creates a pixel point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Returns this point moved vertically by `dy` pixels (positive is down).
    #[must_use]
    pub fn shifted_y(self, dy: f64) -> Self {
        Self {
            x: self.x,
            y: self.y + dy,
        }
    }
}

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Creates a frame size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Landmark ID to normalized position, as produced by the landmark model for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: HashMap<u32, NormalizedPoint>,
}

impl LandmarkSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a landmark.
    pub fn insert(&mut self, id: u32, point: NormalizedPoint) {
        self.points.insert(id, point);
    }

    /// Returns the landmark with the given ID.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<NormalizedPoint> {
        self.points.get(&id).copied()
    }

    /// Returns the landmark denormalized to pixel space.
    #[must_use]
    pub fn pixel(&self, id: u32, size: FrameSize) -> Option<PixelPoint> {
        self.get(id).map(|p| p.to_pixel(size))
    }

    /// Returns the IDs from `required` that are absent, in the given order.
    #[must_use]
    pub fn missing(&self, required: &[u32]) -> Vec<u32> {
        required
            .iter()
            .copied()
            .filter(|id| !self.points.contains_key(id))
            .collect()
    }

    /// Number of landmarks present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the set holds no landmarks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<(u32, NormalizedPoint)> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = (u32, NormalizedPoint)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// One frame of landmark input.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    /// Elapsed session time in seconds.
    pub timestamp: f64,
    /// Pixel dimensions of the source frame.
    pub size: FrameSize,
    /// Landmarks detected on the face.
    pub landmarks: LandmarkSet,
}

impl LandmarkFrame {
    /// Creates a landmark frame.
    #[must_use]
    pub const fn new(timestamp: f64, size: FrameSize, landmarks: LandmarkSet) -> Self {
        Self {
            timestamp,
            size,
            landmarks,
        }
    }
}
