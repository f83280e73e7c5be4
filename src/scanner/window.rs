use crate::util;
use std::path::Path;
use std::time::SystemTime;
use tracing::warn;

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Time span a model run was executing, derived from marker files.
///
/// A missing start marker means every file predates the run (all are inputs).
/// A missing end marker means no file can be a post-run output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl RunWindow {
    pub fn started(&self) -> bool {
        self.start.is_some()
    }

    pub fn ended(&self) -> bool {
        self.end.is_some()
    }

    /// Start time as reported to users, epoch 0 when the run never started.
    pub fn start_time(&self) -> i64 {
        self.start.unwrap_or(0)
    }

    pub fn is_before_start(&self, modified: i64) -> bool {
        match self.start {
            Some(start) => modified < start,
            None => true,
        }
    }

    /// Compares the full-precision time against the whole-second end, so an
    /// output written later within the end marker's second still counts.
    pub fn is_after_end(&self, modified: SystemTime) -> bool {
        match self.end {
            Some(end) => util::unix_nanos(modified) > i128::from(end) * NANOS_PER_SEC,
            None => false,
        }
    }
}

/// Earliest modification time among start markers and among end markers.
/// `files` yields `(path, modified_seconds)` pairs for the folder's direct children.
pub fn detect_run_window<'a, I>(
    run_folder: &Path,
    files: I,
    start_markers: &[String],
    end_markers: &[String],
) -> RunWindow
where
    I: IntoIterator<Item = (&'a Path, i64)>,
{
    let mut start: Option<i64> = None;
    let mut end: Option<i64> = None;

    for (path, modified) in files {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if start_markers.iter().any(|m| m == name) {
            start = Some(start.map_or(modified, |s| s.min(modified)));
        } else if end_markers.iter().any(|m| m == name) {
            end = Some(end.map_or(modified, |e| e.min(modified)));
        }
    }

    let window = RunWindow { start, end };
    if !window.started() {
        warn!(
            "Model run in {} did not start, every file is treated as an input",
            run_folder.display()
        );
    }
    if !window.ended() {
        warn!(
            "Model run in {} did not end, no outputs will be kept",
            run_folder.display()
        );
    }
    window
}
