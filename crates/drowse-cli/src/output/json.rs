//! JSON output adapter.

use anyhow::Result;
use drowse_core::{FrameReport, Record, ReportOutput, SessionSummary};
use std::io::{self, Write};
use std::sync::Mutex;

/// JSON Lines output adapter.
///
/// Every line is a [`Record`] tagged with its `kind`.
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonOutput {
    /// Creates a new JSON output writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Creates a new JSON output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Writes a batch of session summaries as a JSON array.
    #[allow(clippy::significant_drop_tightening)]
    pub fn write_array(&self, summaries: &[SessionSummary], pretty: bool) -> Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(summaries)?
        } else {
            serde_json::to_string(summaries)?
        };
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}")?;
        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    fn write_record(&self, record: &Record) -> Result<()> {
        let json = serde_json::to_string(record)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}")?;
        Ok(())
    }
}

impl ReportOutput for JsonOutput {
    fn write_frame(&self, report: &FrameReport) -> Result<()> {
        self.write_record(&Record::Frame(report.clone()))
    }

    fn write_summary(&self, summary: &SessionSummary) -> Result<()> {
        self.write_record(&Record::Summary(summary.clone()))
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use drowse_core::Session;
    use drowse_test_support::SyntheticFaceBuilder;
    use serde_json::Value;
    use std::sync::Arc;

    /// Writer that keeps everything in a shared buffer.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn lines(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    #[test]
    fn test_records_are_tagged() {
        let buf = SharedBuf::default();
        let output = JsonOutput::new(Box::new(buf.clone()));
        let mut session = Session::default();
        let report = session
            .process(&SyntheticFaceBuilder::awake().frame(0.0))
            .unwrap();

        output.write_frame(&report).unwrap();
        output.write_summary(&session.summary("cam")).unwrap();
        output.flush().unwrap();

        let lines = buf.lines();
        assert_eq!(lines[0]["kind"], "frame");
        assert_eq!(lines[0]["status"], "awake");
        assert_eq!(lines[1]["kind"], "summary");
        assert_eq!(lines[1]["source"], "cam");
    }

    #[test]
    fn test_write_array() {
        let buf = SharedBuf::default();
        let output = JsonOutput::new(Box::new(buf.clone()));
        let summaries = vec![
            Session::default().summary("a"),
            Session::default().summary("b"),
        ];

        output.write_array(&summaries, false).unwrap();

        let lines = buf.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].as_array().unwrap().len(), 2);
    }
}
