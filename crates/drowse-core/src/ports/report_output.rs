//! Report output port for writing frame reports and session summaries.

use crate::domain::{FrameReport, SessionSummary};

/// Port for outputting detection results.
pub trait ReportOutput: Send + Sync {
    /// Writes a single frame report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_frame(&self, report: &FrameReport) -> anyhow::Result<()>;

    /// Writes the totals of a finished session.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_summary(&self, summary: &SessionSummary) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
