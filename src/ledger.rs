use crate::error::Error;
use crate::variant::Category;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const PARENT_FOLDER_HEADER: &str = "Parent Folder";
pub const FILE_NAME_HEADER: &str = "File Name";

/// One row of a category catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LedgerRow {
    #[serde(rename = "Parent Folder")]
    pub parent_folder: String,
    #[serde(rename = "File Name")]
    pub file_name: String,
}

/// The encoded file names one run folder depends on, for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub run_folder: String,
    pub encoded_names: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AppendStats {
    pub rows_appended: usize,
    pub runs_appended: usize,
    pub runs_skipped: usize,
}

/// Append-only CSV catalogs, one per category, under the ledger root.
#[derive(Debug, Clone)]
pub struct Ledger {
    root: PathBuf,
}

impl Ledger {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self, category: Category) -> PathBuf {
        self.root.join(category.ledger_file_name())
    }

    /// All rows of a category catalog. A missing catalog reads as empty.
    pub fn rows(&self, category: Category) -> Result<Vec<LedgerRow>, Error> {
        let path = self.catalog_path(category);
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize::<LedgerRow>() {
            rows.push(row?);
        }
        Ok(rows)
    }

    pub fn logged_runs(&self, category: Category) -> Result<AHashSet<String>, Error> {
        Ok(self
            .rows(category)?
            .into_iter()
            .map(|row| row.parent_folder)
            .collect())
    }

    /// Append entries whose run folder is not yet in the catalog. Runs already
    /// present are skipped as a whole, even if their file list differs.
    pub fn append(&self, category: Category, entries: &[LedgerEntry]) -> Result<AppendStats, Error> {
        let path = self.catalog_path(category);
        let needs_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let existing = self.logged_runs(category)?;

        if !self.root.is_dir() {
            fs::create_dir_all(&self.root)?;
        }
        let file = OpenOptions::new().append(true).create(true).open(&path)?;
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if needs_header {
            wtr.write_record([PARENT_FOLDER_HEADER, FILE_NAME_HEADER])?;
        }

        let mut stats = AppendStats::default();
        for entry in entries {
            if existing.contains(&entry.run_folder) {
                debug!("{} already logged in {}, skipping", entry.run_folder, path.display());
                stats.runs_skipped += 1;
                continue;
            }
            for name in &entry.encoded_names {
                wtr.serialize(LedgerRow {
                    parent_folder: entry.run_folder.clone(),
                    file_name: name.clone(),
                })?;
                stats.rows_appended += 1;
            }
            stats.runs_appended += 1;
        }

        wtr.flush()?;
        info!(
            "{}: {} rows appended, {} runs already logged",
            category, stats.rows_appended, stats.runs_skipped
        );
        Ok(stats)
    }

    /// Encoded names logged for a run folder, in catalog order.
    pub fn files_for(&self, category: Category, run_folder: &str) -> Result<Vec<String>, Error> {
        Ok(self
            .rows(category)?
            .into_iter()
            .filter(|row| row.parent_folder == run_folder)
            .map(|row| row.file_name)
            .collect())
    }

    /// Distinct run folders in the run-folder catalog, first-seen order.
    pub fn runs(&self) -> Result<Vec<String>, Error> {
        let mut seen = AHashSet::new();
        let mut runs = Vec::new();
        for row in self.rows(Category::RunFolder)? {
            if seen.insert(row.parent_folder.clone()) {
                runs.push(row.parent_folder);
            }
        }
        Ok(runs)
    }

    pub fn contains_run(&self, run_folder: &str) -> Result<bool, Error> {
        Ok(self
            .rows(Category::RunFolder)?
            .iter()
            .any(|row| row.parent_folder == run_folder))
    }
}
