//! Configuration file support for drowse.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/drowse/config.toml` (lowest priority)
//! - Project-local: `.drowse.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Eye closure settings.
    pub eyes: EyesConfig,
    /// Yawn detection settings.
    pub mouth: MouthConfig,
    /// Input discovery settings.
    pub input: InputConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// Eye closure configuration.
///
/// Frame counts are expressed at `reference_fps` and converted to durations.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct EyesConfig {
    /// Eye aspect ratio below which the eyes count as closed (0.0-1.0).
    pub closure_threshold: Option<f64>,
    /// Closed frames needed for a blink.
    pub min_blink_frames: Option<u32>,
    /// Closed frames before the asleep alarm.
    pub asleep_frames: Option<u32>,
    /// Frame rate the frame counts refer to.
    pub reference_fps: Option<f64>,
}

/// Yawn detection configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MouthConfig {
    /// Mouth aspect ratio above which the mouth counts as open (0.0-1.0).
    pub mar_threshold: Option<f64>,
    /// Lip gap in pixels above which the mouth counts as open.
    pub min_gap_px: Option<f64>,
    /// Seconds the mouth must stay open for a yawn.
    pub min_yawn_secs: Option<f64>,
    /// Vertical widening of the lip midpoints, in pixels.
    pub lip_margin_px: Option<f64>,
}

/// Input configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Frame rate for recordings without timestamps.
    pub fps: Option<f64>,
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
    /// Include contour polygons in frame reports.
    pub overlay: Option<bool>,
    /// Only write session summaries.
    pub summary_only: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/drowse/config.toml`
    /// 2. Project-local: `.drowse.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load XDG config (lowest priority)
        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        // Load project-local config (higher priority, merged)
        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        for problem in config.validate() {
            eprintln!("warning: {problem}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    ///
    /// Each out-of-range value is cleared so the built-in default applies,
    /// and one message per cleared value is returned.
    fn validate(&mut self) -> Vec<String> {
        let mut problems = Vec::new();

        for (key, value) in [
            ("eyes.closure_threshold", &mut self.eyes.closure_threshold),
            ("mouth.mar_threshold", &mut self.mouth.mar_threshold),
        ] {
            drop_invalid(
                key,
                value,
                |t| (0.0..=1.0).contains(t),
                "must be 0.0-1.0",
                &mut problems,
            );
        }

        for (key, value) in [
            ("eyes.min_blink_frames", &mut self.eyes.min_blink_frames),
            ("eyes.asleep_frames", &mut self.eyes.asleep_frames),
        ] {
            drop_invalid(
                key,
                value,
                |n| *n >= 1,
                "must be at least 1",
                &mut problems,
            );
        }

        for (key, value) in [
            ("eyes.reference_fps", &mut self.eyes.reference_fps),
            ("input.fps", &mut self.input.fps),
            ("mouth.min_yawn_secs", &mut self.mouth.min_yawn_secs),
        ] {
            drop_invalid(
                key,
                value,
                |v| v.is_finite() && *v > 0.0,
                "must be positive",
                &mut problems,
            );
        }

        for (key, value) in [
            ("mouth.min_gap_px", &mut self.mouth.min_gap_px),
            ("mouth.lip_margin_px", &mut self.mouth.lip_margin_px),
        ] {
            drop_invalid(
                key,
                value,
                |v| v.is_finite() && *v >= 0.0,
                "must not be negative",
                &mut problems,
            );
        }

        drop_invalid(
            "output.format",
            &mut self.output.format,
            |f| f == "json" || f == "jsonl",
            "must be 'json' or 'jsonl'",
            &mut problems,
        );

        problems
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // Eyes
        self.eyes.closure_threshold = other.eyes.closure_threshold.or(self.eyes.closure_threshold);
        self.eyes.min_blink_frames = other.eyes.min_blink_frames.or(self.eyes.min_blink_frames);
        self.eyes.asleep_frames = other.eyes.asleep_frames.or(self.eyes.asleep_frames);
        self.eyes.reference_fps = other.eyes.reference_fps.or(self.eyes.reference_fps);

        // Mouth
        self.mouth.mar_threshold = other.mouth.mar_threshold.or(self.mouth.mar_threshold);
        self.mouth.min_gap_px = other.mouth.min_gap_px.or(self.mouth.min_gap_px);
        self.mouth.min_yawn_secs = other.mouth.min_yawn_secs.or(self.mouth.min_yawn_secs);
        self.mouth.lip_margin_px = other.mouth.lip_margin_px.or(self.mouth.lip_margin_px);

        // Input
        self.input.fps = other.input.fps.or(self.input.fps);
        self.input.recursive = other.input.recursive.or(self.input.recursive);

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
        self.output.overlay = other.output.overlay.or(self.output.overlay);
        self.output.summary_only = other.output.summary_only.or(self.output.summary_only);
    }
}

/// Clear `value` when it fails `is_valid`, recording why.
fn drop_invalid<T: std::fmt::Debug>(
    key: &str,
    value: &mut Option<T>,
    is_valid: impl Fn(&T) -> bool,
    requirement: &str,
    problems: &mut Vec<String>,
) {
    if let Some(v) = value.take_if(|v| !is_valid(v)) {
        problems.push(format!("{key} {requirement}, got {v:?}; using the default"));
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("drowse").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.drowse.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".drowse.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
