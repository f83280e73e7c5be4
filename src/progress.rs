/// Trait for reporting catalog and rebuild progress.
///
/// The CLI implements it with indicatif bars. All methods default to no-ops.
pub trait ProgressReporter: Send + Sync {
    fn on_catalog_start(&self, _total_runs: usize) {}
    fn on_run_progress(&self, _runs_done: usize, _total_runs: usize, _current_run: &str) {}
    fn on_catalog_complete(&self, _runs_logged: usize, _duration_secs: f64) {}
    fn on_rebuild_start(&self, _total_files: usize) {}
    fn on_rebuild_progress(&self, _files_done: usize, _total_files: usize) {}
    fn on_rebuild_complete(&self, _files_copied: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
