//! Progress reporting port for UI integration.

use crate::domain::{SessionSummary, Status};

/// Events emitted while replaying landmark streams.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A session started reading from a source.
    SessionStarted {
        /// Name of the source.
        source: String,
        /// Index of the source in the batch (0-based).
        index: usize,
        /// Total sources in the batch, if known.
        total: Option<usize>,
    },
    /// A source could not be opened.
    SourceFailed {
        /// Name of the source.
        source: String,
        /// Why it failed.
        reason: String,
    },
    /// A frame went through both trackers.
    FrameProcessed {
        /// Frame index within the session.
        index: u64,
        /// Overall state after the frame.
        status: Status,
    },
    /// A frame was skipped due to an error.
    FrameSkipped {
        /// Frame index within the session.
        index: u64,
        /// Reason for skipping.
        reason: String,
    },
    /// The asleep alarm went up.
    AlarmRaised {
        /// Session time in seconds.
        timestamp: f64,
    },
    /// A session ran out of frames.
    SessionFinished {
        /// Totals for the session.
        summary: SessionSummary,
    },
    /// All sources have been processed.
    Finished {
        /// Sources read to the end.
        sessions: usize,
        /// Sources that could not be opened.
        failed: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
