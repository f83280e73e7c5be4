use crate::archive::{Archive, CategoryIndexes};
use crate::config::AppConfig;
use crate::error::Error;
use crate::ledger::{AppendStats, Ledger, LedgerEntry};
use crate::normalize::normalize_path;
use crate::progress::ProgressReporter;
use crate::scanner::{scan_run_folder, scan_supporting_folder, FolderScan, ScanRules};
use crate::util;
use crate::variant::Category;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct CatalogEngine {
    config: AppConfig,
}

#[derive(Debug, Default)]
pub struct CatalogResult {
    pub duration: Duration,
    pub runs_listed: usize,
    pub runs_scanned: usize,
    pub runs_missing: Vec<String>,
    pub runs_not_started: usize,
    pub runs_not_ended: usize,
    pub files_copied: usize,
    pub files_reused: usize,
    pub integrity_mismatches: usize,
    pub appended: Vec<(Category, AppendStats)>,
}

impl CatalogResult {
    pub fn rows_appended(&self) -> usize {
        self.appended.iter().map(|(_, s)| s.rows_appended).sum()
    }

    pub fn runs_logged(&self) -> usize {
        self.appended
            .iter()
            .find(|(c, _)| *c == Category::RunFolder)
            .map(|(_, s)| s.runs_appended)
            .unwrap_or_default()
    }
}

/// Pending ledger entries for a batch, one list per category. A run folder seen
/// twice keeps the later scan.
#[derive(Debug, Default)]
struct BatchLog {
    entries: Vec<(Category, Vec<LedgerEntry>)>,
}

impl BatchLog {
    fn new() -> Self {
        Self {
            entries: Category::ALL.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }

    fn record(&mut self, category: Category, run_folder: &str, scan: &FolderScan) {
        if let Some((_, list)) = self.entries.iter_mut().find(|(c, _)| *c == category) {
            let entry = LedgerEntry {
                run_folder: run_folder.to_string(),
                encoded_names: scan.encoded_names.clone(),
            };
            match list.iter_mut().find(|e| e.run_folder == run_folder) {
                Some(existing) => *existing = entry,
                None => list.push(entry),
            }
        }
    }
}

impl CatalogEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Catalog every run folder listed in the configured run-list CSV.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<CatalogResult, Error> {
        let csv_path = self
            .config
            .run_list_csv
            .as_ref()
            .ok_or_else(|| Error::Other("No run_list_csv configured".to_string()))?;
        let run_folders = read_run_list(csv_path, &self.config.run_list_column)?;
        self.catalog(&run_folders, reporter)
    }

    /// Scan the given run folders, archive new variants and append the ledgers.
    pub fn catalog(
        &self,
        run_folders: &[String],
        reporter: &dyn ProgressReporter,
    ) -> Result<CatalogResult, Error> {
        let start = Instant::now();
        let ledger_root = self.config.ledger_dir.as_path();
        seed_ledger_root(ledger_root, self.config.template_dir.as_deref())?;

        let archive = Archive::new(ledger_root).with_verify_existing(self.config.verify_existing);
        let ledger = Ledger::new(ledger_root);
        let rules = ScanRules::new(
            &self.config.start_markers,
            &self.config.end_markers,
            &self.config.outputs_to_keep,
            &self.config.ignore_patterns,
        );

        let mut indexes = CategoryIndexes::new();
        let mut batch = BatchLog::new();
        let mut result = CatalogResult {
            runs_listed: run_folders.len(),
            ..CatalogResult::default()
        };

        reporter.on_catalog_start(run_folders.len());

        for (i, raw) in run_folders.iter().enumerate() {
            let run_key = normalize_path(raw, &self.config.path_rules);
            reporter.on_run_progress(i, run_folders.len(), &run_key);
            let run_folder = PathBuf::from(&run_key);

            if !run_folder.is_dir() {
                warn!("Could not find: {}", run_key);
                result.runs_missing.push(run_key);
                continue;
            }
            info!("Logging and copying over files from: {}", run_key);

            let run_scan = scan_run_folder(&run_folder, &rules, &archive, indexes.get_mut(Category::RunFolder))?;
            if let Some(window) = run_scan.window {
                if !window.started() {
                    result.runs_not_started += 1;
                }
                if !window.ended() {
                    result.runs_not_ended += 1;
                }
            }
            tally(&mut result, &run_scan);
            batch.record(Category::RunFolder, &run_key, &run_scan);

            let parent = run_folder.parent().unwrap_or_else(|| Path::new(""));
            for category in Category::SUPPORTING {
                let mut folder = parent.to_path_buf();
                for segment in category.supporting_segments().unwrap_or_default() {
                    folder.push(segment);
                }
                let scan = scan_supporting_folder(&folder, &rules, &archive, indexes.get_mut(category))?;
                debug!("{} {} files from {}", scan.encoded_names.len(), category, folder.display());
                tally(&mut result, &scan);
                batch.record(category, &run_key, &scan);
            }

            result.runs_scanned += 1;
        }
        reporter.on_run_progress(run_folders.len(), run_folders.len(), "");

        for (category, entries) in &batch.entries {
            let stats = ledger.append(*category, entries)?;
            result.appended.push((*category, stats));
        }

        result.duration = start.elapsed();
        reporter.on_catalog_complete(result.runs_logged(), result.duration.as_secs_f64());
        info!(
            "{} variants indexed across categories, {} newly archived",
            indexes.total(),
            result.files_copied
        );
        Ok(result)
    }
}

fn tally(result: &mut CatalogResult, scan: &FolderScan) {
    result.files_copied += scan.copied;
    result.files_reused += scan.reused;
    result.integrity_mismatches += scan.mismatched;
}

/// Copy the template tree into a ledger root that does not exist yet.
fn seed_ledger_root(root: &Path, template: Option<&Path>) -> Result<(), Error> {
    if root.is_dir() {
        return Ok(());
    }
    match template {
        Some(template) if template.is_dir() => {
            info!("Seeding {} from template {}", root.display(), template.display());
            util::copy_tree(template, root)?;
        }
        Some(template) => {
            return Err(Error::Other(format!(
                "Template folder {} does not exist",
                template.display()
            )));
        }
        None => {}
    }
    Ok(())
}

/// Read run folder paths from one column of a CSV with a header row.
pub fn read_run_list(csv_path: &Path, column: &str) -> Result<Vec<String>, Error> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let headers = reader.headers()?.clone();
    let idx = headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| Error::MissingColumn {
            file: csv_path.display().to_string(),
            column: column.to_string(),
        })?;

    let mut runs = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(value) = record.get(idx) {
            let value = value.trim();
            if !value.is_empty() {
                runs.push(value.to_string());
            }
        }
    }
    Ok(runs)
}
