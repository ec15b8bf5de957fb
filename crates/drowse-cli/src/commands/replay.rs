//! Replay command - run landmark recordings through the detectors.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use drowse_adapters::{collect_recordings, FsLandmarkSource, StreamLandmarkSource};
use drowse_core::{
    EyeConfig, LandmarkSource, MouthConfig, ProgressEvent, ProgressSink, ReportOutput, Session,
    SessionConfig, SessionSummary,
};
use tracing::{debug, info};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (frame records, then one summary per recording)
    #[default]
    Jsonl,
    /// Single JSON array of session summaries
    Json,
}

/// Parse and validate a ratio threshold (0.0-1.0).
fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Parse a strictly positive, finite number.
fn parse_positive(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} must be greater than 0"))
    }
}

/// Parse a non-negative, finite number.
fn parse_non_negative(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} must not be negative"))
    }
}

/// Shared arguments for replaying recordings.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct ReplayArgs {
    /// Recordings or directories to replay (`-` reads stdin)
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Frame rate for records without a timestamp
    #[arg(long, value_parser = parse_positive)]
    pub fps: Option<f64>,

    /// Eye aspect ratio below which the eyes count as closed (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    pub ear_threshold: Option<f64>,

    /// Closed frames (at the reference rate) needed for a blink
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub blink_frames: Option<u32>,

    /// Closed frames (at the reference rate) before the asleep alarm
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub asleep_frames: Option<u32>,

    /// Mouth aspect ratio above which the mouth counts as open (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    pub mar_threshold: Option<f64>,

    /// Lip gap in pixels above which the mouth counts as open
    #[arg(long, value_parser = parse_non_negative)]
    pub min_gap: Option<f64>,

    /// Seconds the mouth must stay open for a yawn
    #[arg(long, value_parser = parse_positive)]
    pub min_yawn: Option<f64>,

    /// Include eye and lip contour polygons in frame records
    #[arg(long)]
    pub overlay: bool,

    /// Only write session summaries
    #[arg(long)]
    pub summary_only: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl ReplayArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.input.recursive.unwrap_or(false);
        }
        args.fps = args.fps.or(config.input.fps);

        // Thresholds: CLI > config (accessors provide hardcoded fallback)
        args.ear_threshold = args.ear_threshold.or(config.eyes.closure_threshold);
        args.blink_frames = args.blink_frames.or(config.eyes.min_blink_frames);
        args.asleep_frames = args.asleep_frames.or(config.eyes.asleep_frames);
        args.mar_threshold = args.mar_threshold.or(config.mouth.mar_threshold);
        args.min_gap = args.min_gap.or(config.mouth.min_gap_px);
        args.min_yawn = args.min_yawn.or(config.mouth.min_yawn_secs);

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }

        // Boolean output options: CLI flag wins, then config
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }
        if !args.overlay {
            args.overlay = config.output.overlay.unwrap_or(false);
        }
        if !args.summary_only {
            args.summary_only = config.output.summary_only.unwrap_or(false);
        }

        // Kept for settings without a CLI flag
        args.config = Some(config.clone());

        args
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }

    /// Builds tracker settings from the merged arguments.
    fn session_config(&self) -> SessionConfig {
        let config = self.config.as_ref();
        let reference_fps = config
            .and_then(|c| c.eyes.reference_fps)
            .unwrap_or(EyeConfig::REFERENCE_FPS);

        let eyes = EyeConfig::from_frame_counts(
            reference_fps,
            self.blink_frames.unwrap_or(EyeConfig::DEFAULT_BLINK_FRAMES),
            self.asleep_frames.unwrap_or(EyeConfig::DEFAULT_ASLEEP_FRAMES),
        )
        .with_closure_threshold(
            self.ear_threshold
                .unwrap_or(EyeConfig::DEFAULT_CLOSURE_THRESHOLD),
        );

        let defaults = MouthConfig::default();
        let mouth = MouthConfig {
            mar_threshold: self.mar_threshold.unwrap_or(defaults.mar_threshold),
            min_gap_px: self.min_gap.unwrap_or(defaults.min_gap_px),
            min_yawn: self
                .min_yawn
                .and_then(|s| Duration::try_from_secs_f64(s).ok())
                .unwrap_or(defaults.min_yawn),
            lip_margin_px: config
                .and_then(|c| c.mouth.lip_margin_px)
                .unwrap_or(defaults.lip_margin_px),
        };

        SessionConfig {
            eyes,
            mouth,
            overlay: self.overlay,
        }
    }

    /// Expands the given paths into inputs, in command-line order.
    fn inputs(&self) -> Vec<Input> {
        let mut inputs = Vec::new();
        for path in &self.paths {
            if path.as_os_str() == "-" {
                inputs.push(Input::Stdin);
            } else {
                inputs.extend(
                    collect_recordings(std::slice::from_ref(path), self.recursive)
                        .into_iter()
                        .map(Input::File),
                );
            }
        }
        inputs
    }
}

/// One landmark stream to replay.
enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    fn name(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    fn open(&self, fps: Option<f64>) -> Result<Box<dyn LandmarkSource>> {
        Ok(match self {
            Self::Stdin => Box::new(StreamLandmarkSource::stdin().with_fps(fps)),
            Self::File(path) => Box::new(FsLandmarkSource::open(path, fps)?),
        })
    }
}

/// Result of running the replay command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct ReplayResult {
    /// Recordings replayed to the end.
    pub sessions: usize,
    /// Recordings that could not be opened.
    pub failed: usize,
    /// Asleep alarms raised across all recordings.
    pub alarms: u32,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the replay command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &ReplayArgs) -> Result<ReplayResult> {
    info!("Running replay command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        bail!("No inputs specified");
    }

    let inputs = args.inputs();
    if inputs.is_empty() {
        bail!("No recordings found");
    }

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = ProgressBar::new(Some(inputs.len() as u64), args.quiet, show_progress);
    let output = JsonOutput::stdout();

    replay_inputs(&inputs, &output, &progress, args)
}

/// Replays every input in its own session.
fn replay_inputs(
    inputs: &[Input],
    output: &JsonOutput,
    progress: &ProgressBar,
    args: &ReplayArgs,
) -> Result<ReplayResult> {
    let config = args.session_config();
    debug!(?config, "Session configuration");

    let total = inputs.len();
    let mut sessions = 0usize;
    let mut failed = 0usize;
    let mut alarms = 0u32;
    let mut summaries: Vec<SessionSummary> = Vec::new();

    for (index, input) in inputs.iter().enumerate() {
        let source = match input.open(args.fps) {
            Ok(source) => source,
            Err(e) => {
                progress.on_event(ProgressEvent::SourceFailed {
                    source: input.name(),
                    reason: format!("{e:#}"),
                });
                failed += 1;
                continue;
            }
        };

        progress.on_event(ProgressEvent::SessionStarted {
            source: source.name().to_string(),
            index,
            total: Some(total),
        });

        let summary = replay_source(source.as_ref(), config, output, progress, args)?;
        alarms += summary.alarms;
        sessions += 1;

        progress.on_event(ProgressEvent::SessionFinished {
            summary: summary.clone(),
        });

        match args.format() {
            OutputFormat::Jsonl => output.write_summary(&summary)?,
            OutputFormat::Json => summaries.push(summary),
        }
    }

    if args.format() == OutputFormat::Json {
        output.write_array(&summaries, args.pretty)?;
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished { sessions, failed });

    if sessions == 0 {
        bail!("None of the {failed} recording(s) could be opened");
    }

    let exit_code = if alarms > 0 {
        ExitCode::AlarmRaised
    } else {
        ExitCode::Success
    };

    Ok(ReplayResult {
        sessions,
        failed,
        alarms,
        exit_code,
    })
}

/// Feeds one source through a fresh session and returns its totals.
fn replay_source(
    source: &dyn LandmarkSource,
    config: SessionConfig,
    output: &dyn ReportOutput,
    progress: &dyn ProgressSink,
    args: &ReplayArgs,
) -> Result<SessionSummary> {
    info!(source = source.name(), "Replaying");

    let write_frames = args.format() == OutputFormat::Jsonl && !args.summary_only;
    let mut session = Session::new(config);

    for item in source.frames() {
        let index = session.frames() + session.skipped();

        let frame = match item {
            Ok(frame) => frame,
            Err(e) => {
                let reason = format!("{e:#}");
                session.skip(&reason);
                progress.on_event(ProgressEvent::FrameSkipped { index, reason });
                continue;
            }
        };

        let alarm_before = session.eyes().alarm();
        let report = match session.process(&frame) {
            Ok(report) => report,
            Err(e) => {
                progress.on_event(ProgressEvent::FrameSkipped {
                    index,
                    reason: format!("{e:#}"),
                });
                continue;
            }
        };

        if report.eyes.alarm && !alarm_before {
            info!(
                source = source.name(),
                timestamp = report.timestamp,
                "Asleep alarm raised"
            );
            progress.on_event(ProgressEvent::AlarmRaised {
                timestamp: report.timestamp,
            });
        }

        progress.on_event(ProgressEvent::FrameProcessed {
            index: report.index,
            status: report.status,
        });

        if write_frames {
            output.write_frame(&report)?;
        }
    }

    let mut summary = session.summary(source.name());
    summary.finished_at = Some(iso_timestamp());
    info!(
        source = source.name(),
        frames = summary.frames,
        skipped = summary.skipped,
        blinks = summary.blinks,
        yawns = summary.yawns,
        alarms = summary.alarms,
        "Replay finished"
    );
    Ok(summary)
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
