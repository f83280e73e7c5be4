use indicatif::{ProgressBar, ProgressStyle};
use model_catalog::ProgressReporter;
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Catalog phase: bar over run folders
/// - Rebuild phase: bar over files
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn start_bar(&self, label: &str, total: usize) {
        let pb = ProgressBar::new(total as u64);
        let template = format!(
            "  {{spinner:.cyan}} {} [{{bar:30.cyan/dim}}] {{pos}}/{{len}} {{msg}}",
            label
        );
        let style = ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─")
            .tick_chars(TICK_CHARS);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn update(&self, done: usize, message: Option<&str>) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_position(done as u64);
                if let Some(message) = message {
                    pb.set_message(message.to_string());
                }
            }
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_catalog_start(&self, total_runs: usize) {
        self.start_bar("Cataloging", total_runs);
    }

    fn on_run_progress(&self, runs_done: usize, _total_runs: usize, current_run: &str) {
        self.update(runs_done, Some(current_run));
    }

    fn on_catalog_complete(&self, runs_logged: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Catalog complete: {} new runs logged in {:.2}s",
            runs_logged, duration_secs
        );
    }

    fn on_rebuild_start(&self, total_files: usize) {
        self.start_bar("Rebuilding", total_files);
    }

    fn on_rebuild_progress(&self, files_done: usize, _total_files: usize) {
        self.update(files_done, None);
    }

    fn on_rebuild_complete(&self, files_copied: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Rebuild complete: {} files restored in {:.2}s",
            files_copied, duration_secs
        );
    }
}
