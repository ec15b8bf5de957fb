//! Landmark source port for receiving frames from a detector or recording.

use crate::domain::LandmarkFrame;

/// Port for reading landmark frames in session order.
pub trait LandmarkSource: Send + Sync {
    /// Returns an iterator over the frames of this source.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if a frame cannot be decoded. Callers
    /// should count them as skipped and keep reading.
    fn frames(&self) -> Box<dyn Iterator<Item = anyhow::Result<LandmarkFrame>> + Send + '_>;

    /// Human-readable name of the source, used in summaries.
    fn name(&self) -> &str;
}
