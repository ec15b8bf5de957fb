//! Filesystem adapter for landmark recordings.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use drowse_core::{LandmarkFrame, LandmarkSource};
use tracing::{debug, warn};

use crate::stream::StreamLandmarkSource;

/// Extensions picked up when scanning directories.
const RECORDING_EXTENSIONS: &[&str] = &["jsonl", "ndjson"];

/// Collects recording files from the given paths.
///
/// Files named explicitly are always taken. Directories contribute their
/// `.jsonl` / `.ndjson` files in name order, descending into subdirectories
/// only when `recursive` is set.
#[must_use]
pub fn collect_recordings(paths: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if !is_recording(path) {
                debug!("Reading {} despite its extension", path.display());
            }
            files.push(path.clone());
        } else if path.is_dir() {
            collect_from_dir(path, recursive, &mut files);
        } else {
            warn!("Path does not exist: {}", path.display());
        }
    }

    debug!("Found {} recordings", files.len());
    files
}

fn collect_from_dir(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("Failed to read directory {}: {e}", dir.display());
            return;
        }
    };

    let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_file() && is_recording(&path) {
            files.push(path);
        } else if path.is_dir() && recursive {
            collect_from_dir(&path, recursive, files);
        }
    }
}

/// Checks if a path has a recording extension.
fn is_recording(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| RECORDING_EXTENSIONS.contains(&e.as_str()))
}

/// Landmark source backed by one recording file.
pub struct FsLandmarkSource {
    path: PathBuf,
    inner: StreamLandmarkSource,
}

impl FsLandmarkSource {
    /// Opens a recording.
    ///
    /// `fps` times records that carry no `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: &Path, fps: Option<f64>) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open recording: {}", path.display()))?;
        let name = path.to_string_lossy().into_owned();

        Ok(Self {
            path: path.to_path_buf(),
            inner: StreamLandmarkSource::new(name, BufReader::new(file)).with_fps(fps),
        })
    }

    /// Path of the recording.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LandmarkSource for FsLandmarkSource {
    fn frames(&self) -> Box<dyn Iterator<Item = Result<LandmarkFrame>> + Send + '_> {
        self.inner.frames()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
