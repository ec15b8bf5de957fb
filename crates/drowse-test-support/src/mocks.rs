//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use drowse_core::domain::{FrameReport, LandmarkFrame, SessionSummary};
use drowse_core::ports::{LandmarkSource, ProgressEvent, ProgressSink, ReportOutput};

/// Mock implementation of `LandmarkSource` for testing.
///
/// Yields pre-built frames (or decode errors) and tracks iteration for assertions.
pub struct MockLandmarkSource {
    name: String,
    frames: Vec<Result<LandmarkFrame, String>>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockLandmarkSource {
    /// Creates a new mock source with the given frames.
    #[must_use]
    pub fn new(frames: Vec<LandmarkFrame>) -> Self {
        Self::with_errors(frames.into_iter().map(Ok).collect())
    }

    /// Creates a mock source where some items fail with the given message.
    #[must_use]
    pub fn with_errors(frames: Vec<Result<LandmarkFrame, String>>) -> Self {
        Self {
            name: "mock://landmarks".into(),
            frames,
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl LandmarkSource for MockLandmarkSource {
    fn frames(&self) -> Box<dyn Iterator<Item = anyhow::Result<LandmarkFrame>> + Send + '_> {
        if let Ok(mut c) = self.iteration_count.lock() {
            *c += 1;
        }
        Box::new(
            self.frames
                .iter()
                .map(|item| item.clone().map_err(|e| anyhow::anyhow!(e))),
        )
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Mock implementation of `ReportOutput` for testing.
///
/// Captures reports for later assertions.
pub struct MockReportOutput {
    frames: Arc<Mutex<Vec<FrameReport>>>,
    summaries: Arc<Mutex<Vec<SessionSummary>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockReportOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: Arc::new(Mutex::new(Vec::new())),
            summaries: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured frame reports.
    #[must_use]
    pub fn frames(&self) -> Vec<FrameReport> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns all captured session summaries.
    #[must_use]
    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.summaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockReportOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportOutput for MockReportOutput {
    fn write_frame(&self, report: &FrameReport) -> anyhow::Result<()> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn write_summary(&self, summary: &SessionSummary) -> anyhow::Result<()> {
        self.summaries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(summary.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `FrameProcessed` events.
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::FrameProcessed { .. }))
            .count()
    }

    /// Returns the number of `FrameSkipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::FrameSkipped { .. }))
            .count()
    }

    /// Returns the session times of `AlarmRaised` events.
    #[must_use]
    pub fn alarm_times(&self) -> Vec<f64> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::AlarmRaised { timestamp } => Some(*timestamp),
                _ => None,
            })
            .collect()
    }

    /// Returns whether a `Finished` event was received.
    #[must_use]
    pub fn has_finished(&self) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, ProgressEvent::Finished { .. }))
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { sessions, failed } => Some((*sessions, *failed)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::SyntheticFaceBuilder;
    use drowse_core::Session;

    #[test]
    fn test_mock_landmark_source_empty() {
        let source = MockLandmarkSource::empty();
        assert_eq!(source.frames().count(), 0);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_mock_landmark_source_errors() {
        let source = MockLandmarkSource::with_errors(vec![
            Ok(SyntheticFaceBuilder::awake().frame(0.0)),
            Err("bad line".into()),
        ]);
        let items: Vec<_> = source.frames().collect();
        assert!(items[0].is_ok());
        assert_eq!(items[1].as_ref().unwrap_err().to_string(), "bad line");
    }

    #[test]
    fn test_mock_report_output() {
        let output = MockReportOutput::new();
        let mut session = Session::default();
        let report = session
            .process(&SyntheticFaceBuilder::awake().frame(0.0))
            .unwrap();

        output.write_frame(&report).unwrap();
        output.write_summary(&session.summary("mock")).unwrap();
        output.flush().unwrap();

        assert_eq!(output.frames().len(), 1);
        assert_eq!(output.summaries()[0].source, "mock");
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();

        sink.on_event(ProgressEvent::AlarmRaised { timestamp: 1.5 });
        sink.on_event(ProgressEvent::Finished {
            sessions: 1,
            failed: 0,
        });

        assert_eq!(sink.alarm_times(), vec![1.5]);
        assert!(sink.has_finished());
        assert_eq!(sink.finished_counts(), Some((1, 0)));
    }
}
