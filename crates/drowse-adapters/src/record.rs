//! Wire format of one recorded landmark frame.

use anyhow::{bail, Context, Result};
use drowse_core::{FrameSize, LandmarkFrame, LandmarkSet};
use serde::{Deserialize, Serialize};

/// One line of a landmark recording.
///
/// ```json
/// {"t": 1.25, "width": 640, "height": 480, "landmarks": {"33": [0.41, 0.38]}}
/// ```
///
/// Landmark positions may be given as `[x, y]` arrays or `{"x": .., "y": ..}`
/// objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Elapsed session time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<f64>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Detected landmarks keyed by ID.
    pub landmarks: LandmarkSet,
}

impl FrameRecord {
    /// Parses a single JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not a valid frame record.
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line).context("invalid frame record")
    }

    /// Converts the record into a frame.
    ///
    /// `index` is the position of the record in its recording; it stands in
    /// for a missing `t` when `fps` is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame size is zero, the timestamp is negative
    /// or not finite, or the record has no timestamp and no frame rate is known.
    pub fn into_frame(self, index: u64, fps: Option<f64>) -> Result<LandmarkFrame> {
        if self.width == 0 || self.height == 0 {
            bail!("frame size {}x{} is empty", self.width, self.height);
        }
        #[allow(clippy::cast_precision_loss)]
        let position = index as f64;
        let timestamp = match (self.t, fps) {
            (Some(t), _) => t,
            (None, Some(fps)) if fps.is_finite() && fps > 0.0 => position / fps,
            (None, _) => bail!("record has no timestamp and no frame rate was given"),
        };
        if !timestamp.is_finite() || timestamp < 0.0 {
            bail!("invalid timestamp {timestamp}");
        }
        Ok(LandmarkFrame::new(
            timestamp,
            FrameSize::new(self.width, self.height),
            self.landmarks,
        ))
    }
}

impl From<&LandmarkFrame> for FrameRecord {
    fn from(frame: &LandmarkFrame) -> Self {
        Self {
            t: Some(frame.timestamp),
            width: frame.size.width,
            height: frame.size.height,
            landmarks: frame.landmarks.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const LINE: &str =
        r#"{"t": 1.25, "width": 640, "height": 480, "landmarks": {"33": [0.5, 0.25]}}"#;

    #[test]
    fn test_parse_and_convert() {
        let frame = FrameRecord::parse(LINE).unwrap().into_frame(0, None).unwrap();
        assert!((frame.timestamp - 1.25).abs() < f64::EPSILON);
        assert_eq!(frame.size, FrameSize::new(640, 480));
        let p = frame.landmarks.pixel(33, frame.size).unwrap();
        assert!((p.x - 320.0).abs() < 1e-9);
        assert!((p.y - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_timestamp_uses_frame_rate() {
        let record =
            FrameRecord::parse(r#"{"width": 10, "height": 10, "landmarks": {}}"#).unwrap();
        let frame = record.clone().into_frame(15, Some(30.0)).unwrap();
        assert!((frame.timestamp - 0.5).abs() < 1e-12);

        let err = record.into_frame(15, None).unwrap_err();
        assert!(err.to_string().contains("no timestamp"));
    }

    #[test]
    fn test_rejects_bad_records() {
        assert!(FrameRecord::parse("not json").is_err());
        assert!(FrameRecord::parse(r#"{"t": 0, "width": 10}"#).is_err());

        let empty = r#"{"t": 0, "width": 0, "height": 10, "landmarks": {}}"#;
        assert!(FrameRecord::parse(empty).unwrap().into_frame(0, None).is_err());

        let negative = r#"{"t": -1, "width": 10, "height": 10, "landmarks": {}}"#;
        assert!(FrameRecord::parse(negative)
            .unwrap()
            .into_frame(0, None)
            .is_err());
    }

    #[test]
    fn test_from_frame_keeps_timestamp() {
        let frame = FrameRecord::parse(LINE).unwrap().into_frame(0, None).unwrap();
        let record = FrameRecord::from(&frame);
        assert_eq!(record.t, Some(1.25));
        assert_eq!(record.landmarks.len(), 1);
    }
}
