use super::window::{detect_run_window, RunWindow};
use crate::archive::{Archive, DedupIndex, StoreOutcome};
use crate::util;
use crate::variant::{FileVariant, VariantId};
use glob::Pattern;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, warn};

/// Output kept for rebuilds even though the run wrote it, e.g. `daynet.net`
/// keeps `2035_daynet.net`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepRule {
    pub name_fragment: String,
    pub extension: String,
}

impl KeepRule {
    /// The fragment runs up to the first dot, the extension from the last dot.
    /// Entries without a dot name no extension and are rejected.
    pub fn parse(entry: &str) -> Option<Self> {
        let idx = entry.rfind('.')?;
        let name_fragment = entry.split('.').next().unwrap_or_default().to_string();
        Some(Self {
            name_fragment,
            extension: entry[idx..].to_string(),
        })
    }

    pub fn matches(&self, id: &VariantId) -> bool {
        id.base_name.contains(&self.name_fragment) && id.extension == self.extension
    }
}

/// Classification settings shared by every folder in a batch.
#[derive(Debug, Clone, Default)]
pub struct ScanRules {
    pub start_markers: Vec<String>,
    pub end_markers: Vec<String>,
    pub keep: Vec<KeepRule>,
    pub ignore: Vec<Pattern>,
}

impl ScanRules {
    pub fn new(
        start_markers: &[String],
        end_markers: &[String],
        outputs_to_keep: &[String],
        ignore_globs: &[String],
    ) -> Self {
        let ignore = ignore_globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();

        Self {
            start_markers: start_markers.to_vec(),
            end_markers: end_markers.to_vec(),
            keep: outputs_to_keep
                .iter()
                .filter_map(|entry| {
                    let rule = KeepRule::parse(entry);
                    if rule.is_none() {
                        warn!("Ignoring keep-list entry '{}' without an extension", entry);
                    }
                    rule
                })
                .collect(),
            ignore,
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore.iter().any(|pattern| pattern.matches_path(path))
    }

    fn is_kept_output(&self, id: &VariantId) -> bool {
        self.keep.iter().any(|rule| rule.matches(id))
    }
}

/// Encoded names a folder contributes to one run, plus archive activity.
#[derive(Debug, Default, Clone)]
pub struct FolderScan {
    pub encoded_names: Vec<String>,
    pub copied: usize,
    pub reused: usize,
    pub mismatched: usize,
    pub window: Option<RunWindow>,
}

impl FolderScan {
    fn record(&mut self, id: &VariantId, outcome: StoreOutcome) {
        self.encoded_names.push(id.encode());
        match outcome {
            StoreOutcome::Copied => self.copied += 1,
            StoreOutcome::ExistingMismatch => {
                self.reused += 1;
                self.mismatched += 1;
            }
            StoreOutcome::AlreadyIndexed
            | StoreOutcome::ExistingVerified
            | StoreOutcome::ExistingUnchecked => self.reused += 1,
        }
    }
}

struct ListedFile {
    path: PathBuf,
    modified: SystemTime,
}

impl ListedFile {
    fn seconds(&self) -> i64 {
        util::unix_seconds(self.modified)
    }
}

/// Regular files directly inside `dir` with their modification times, sorted by path.
fn list_files(dir: &Path, rules: &ScanRules) -> io::Result<Vec<ListedFile>> {
    let entries = fs::read_dir(dir).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("Error reading directory {}: {}", dir.display(), err),
        )
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let metadata = fs::metadata(&path).map_err(|err| {
            io::Error::new(
                err.kind(),
                format!("Error getting metadata for {}: {}", path.display(), err),
            )
        })?;
        if !metadata.is_file() || rules.is_ignored(&path) {
            continue;
        }
        files.push(ListedFile {
            path,
            modified: metadata.modified()?,
        });
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Names that are not valid UTF-8 cannot be encoded into the archive and are skipped.
fn variant_for(file: &ListedFile, index: &DedupIndex) -> Option<FileVariant> {
    let name = match file.path.file_name()?.to_str() {
        Some(name) => name,
        None => {
            warn!("Skipping {}, its name is not valid UTF-8", file.path.display());
            return None;
        }
    };
    Some(FileVariant {
        id: VariantId::new(name, file.seconds()),
        source: file.path.clone(),
        category: index.category(),
    })
}

/// Scan a run folder: inputs are files older than the run start, plus keep-list
/// outputs newer than the run end.
pub fn scan_run_folder(
    run_folder: &Path,
    rules: &ScanRules,
    archive: &Archive,
    index: &mut DedupIndex,
) -> io::Result<FolderScan> {
    let files = list_files(run_folder, rules)?;
    let window = detect_run_window(
        run_folder,
        files.iter().map(|f| (f.path.as_path(), f.seconds())),
        &rules.start_markers,
        &rules.end_markers,
    );
    debug!(
        "Run window for {}: start {:?}, end {:?}",
        run_folder.display(),
        window.start,
        window.end
    );

    let mut scan = FolderScan {
        window: Some(window),
        ..FolderScan::default()
    };

    for file in &files {
        let variant = match variant_for(file, index) {
            Some(v) => v,
            None => continue,
        };
        let is_input = window.is_before_start(variant.id.modified);
        let is_kept =
            !is_input && window.is_after_end(file.modified) && rules.is_kept_output(&variant.id);
        if !(is_input || is_kept) {
            continue;
        }
        if is_kept {
            debug!("Keeping output {}", file.path.display());
        }
        let outcome = archive.store(index, &variant)?;
        scan.record(&variant.id, outcome);
    }

    Ok(scan)
}

/// Scan a supporting folder. Every file is an input; a missing folder yields an
/// empty scan.
pub fn scan_supporting_folder(
    folder: &Path,
    rules: &ScanRules,
    archive: &Archive,
    index: &mut DedupIndex,
) -> io::Result<FolderScan> {
    let mut scan = FolderScan::default();
    if !folder.is_dir() {
        debug!("No supporting folder at {}", folder.display());
        return Ok(scan);
    }

    for file in list_files(folder, rules)? {
        let variant = match variant_for(&file, index) {
            Some(v) => v,
            None => continue,
        };
        let outcome = archive.store(index, &variant)?;
        scan.record(&variant.id, outcome);
    }

    Ok(scan)
}
