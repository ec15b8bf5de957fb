//! Line-oriented landmark source over any buffered reader.

use std::io::{self, BufRead, BufReader};
use std::sync::{Mutex, PoisonError};

use anyhow::{anyhow, bail, Context, Result};
use drowse_core::{LandmarkFrame, LandmarkSource};
use tracing::{debug, warn};

use crate::record::FrameRecord;

type Reader = Box<dyn BufRead + Send>;

/// Landmark source reading JSON Lines from a stream such as stdin.
///
/// The stream is consumed by the first call to [`LandmarkSource::frames`];
/// later calls yield nothing.
pub struct StreamLandmarkSource {
    name: String,
    fps: Option<f64>,
    reader: Mutex<Option<Reader>>,
}

impl StreamLandmarkSource {
    /// Creates a source over `reader`, reported under `name`.
    pub fn new(name: impl Into<String>, reader: impl BufRead + Send + 'static) -> Self {
        Self {
            name: name.into(),
            fps: None,
            reader: Mutex::new(Some(Box::new(reader))),
        }
    }

    /// Creates a source over standard input.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new("<stdin>", BufReader::new(io::stdin()))
    }

    /// Sets the frame rate used to time records that carry no `t`.
    #[must_use]
    pub fn with_fps(mut self, fps: Option<f64>) -> Self {
        self.fps = fps;
        self
    }
}

impl LandmarkSource for StreamLandmarkSource {
    fn frames(&self) -> Box<dyn Iterator<Item = Result<LandmarkFrame>> + Send + '_> {
        let reader = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match reader {
            Some(reader) => Box::new(FrameLines::new(reader, self.fps)),
            None => {
                debug!(source = %self.name, "Stream already consumed");
                Box::new(std::iter::empty())
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Decodes frames line by line.
///
/// Blank lines and `#` comments are ignored. A line that fails to decode is
/// yielded as an error and reading continues; a read error ends the stream.
struct FrameLines<R> {
    lines: io::Split<R>,
    fps: Option<f64>,
    line_no: usize,
    records: u64,
    last_timestamp: Option<f64>,
    done: bool,
}

impl<R: BufRead> FrameLines<R> {
    fn new(reader: R, fps: Option<f64>) -> Self {
        Self {
            lines: reader.split(b'\n'),
            fps,
            line_no: 0,
            records: 0,
            last_timestamp: None,
            done: false,
        }
    }

    fn decode(&mut self, line: &str) -> Result<LandmarkFrame> {
        let index = self.records;
        self.records += 1;

        let frame = FrameRecord::parse(line)?.into_frame(index, self.fps)?;
        if let Some(last) = self.last_timestamp {
            if frame.timestamp < last {
                bail!(
                    "timestamp {:.3}s is earlier than the previous frame ({last:.3}s)",
                    frame.timestamp
                );
            }
        }
        self.last_timestamp = Some(frame.timestamp);
        Ok(frame)
    }
}

impl<R: BufRead> Iterator for FrameLines<R> {
    type Item = Result<LandmarkFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let bytes = match self.lines.next()? {
                Ok(bytes) => bytes,
                Err(e) => {
                    self.done = true;
                    warn!("Read failed after line {}: {e}", self.line_no);
                    return Some(Err(anyhow!(e).context(format!(
                        "read failed after line {}",
                        self.line_no
                    ))));
                }
            };
            self.line_no += 1;

            let line = match std::str::from_utf8(&bytes) {
                Ok(line) => line.trim(),
                Err(e) => {
                    self.records += 1;
                    return Some(
                        Err(anyhow!(e)).with_context(|| format!("line {}", self.line_no)),
                    );
                }
            };
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line_no = self.line_no;
            return Some(
                self.decode(line)
                    .with_context(|| format!("line {line_no}")),
            );
        }
        None
    }
}
