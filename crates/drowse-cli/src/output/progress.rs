//! Progress bar adapter using indicatif.

use drowse_core::{ProgressEvent, ProgressSink};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

/// Progress bar adapter for CLI output.
///
/// With a bar, the position counts finished recordings; without one, notable
/// events are printed to stderr.
pub struct ProgressBar {
    bar: Option<IndicatifBar>,
    quiet: bool,
}

impl ProgressBar {
    /// Creates a new progress bar.
    ///
    /// # Arguments
    ///
    /// * `total` - Total number of recordings, if known
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, show progress bar; otherwise print alarms and skips
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        if quiet {
            return Self {
                bar: None,
                quiet: true,
            };
        }

        let bar = if show_bar {
            let bar = total.map_or_else(IndicatifBar::new_spinner, IndicatifBar::new);

            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                bar.set_style(style.progress_chars("#>-"));
            }

            Some(bar)
        } else {
            None
        };

        Self { bar, quiet }
    }

    fn print(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        match event {
            ProgressEvent::SessionStarted {
                source,
                index,
                total,
            } => {
                if let Some(bar) = &self.bar {
                    if let Some(t) = total {
                        bar.set_length(t as u64);
                    }
                    bar.set_position(index as u64);
                    bar.set_message(source);
                }
            }
            ProgressEvent::SourceFailed { source, reason } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
                self.print(&format!("WARN: Skipping {source}: {reason}"));
            }
            ProgressEvent::FrameProcessed { .. } => {
                if let Some(bar) = &self.bar {
                    bar.tick();
                }
            }
            ProgressEvent::FrameSkipped { index, reason } => {
                self.print(&format!("WARN: Skipping frame {index}: {reason}"));
            }
            ProgressEvent::AlarmRaised { timestamp } => {
                self.print(&format!("ALARM: eyes closed past threshold at {timestamp:.2}s"));
            }
            ProgressEvent::SessionFinished { summary } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                } else if summary.alarms > 0 {
                    eprintln!(
                        "{}: {} alarm(s), {} blink(s), {} yawn(s)",
                        summary.source, summary.alarms, summary.blinks, summary.yawns
                    );
                }
            }
            ProgressEvent::Finished { sessions, failed } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(format!(
                        "Done: {sessions} replayed, {failed} failed"
                    ));
                }
            }
        }
    }
}
