use crate::archive::Archive;
use crate::error::Error;
use crate::ledger::Ledger;
use crate::normalize::{normalize_path, PathRule};
use crate::progress::ProgressReporter;
use crate::util;
use crate::variant::{Category, VariantId};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Restores a logged run's input files from the archive.
pub struct Rebuilder<'a> {
    ledger: &'a Ledger,
    archive: &'a Archive,
    template: Option<&'a Path>,
    path_rules: &'a [PathRule],
}

#[derive(Debug, Default)]
pub struct RebuildReport {
    pub run_folder: String,
    pub destination: PathBuf,
    pub copied: usize,
    /// Archived copies referenced by the ledger but absent from the archive.
    pub missing: Vec<(Category, String)>,
    /// Ledger names that are not valid archived variant names.
    pub undecodable: Vec<(Category, String)>,
}

impl<'a> Rebuilder<'a> {
    pub fn new(ledger: &'a Ledger, archive: &'a Archive) -> Self {
        Self {
            ledger,
            archive,
            template: None,
            path_rules: &[],
        }
    }

    pub fn with_template(mut self, template: Option<&'a Path>) -> Self {
        self.template = template;
        self
    }

    pub fn with_path_rules(mut self, rules: &'a [PathRule]) -> Self {
        self.path_rules = rules;
        self
    }

    /// Rebuild `run_folder` into `<dest_root>/<run folder name>`.
    pub fn rebuild(
        &self,
        run_folder: &str,
        dest_root: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<RebuildReport, Error> {
        let start = Instant::now();
        let run_key = normalize_path(run_folder, self.path_rules);
        if !self.ledger.contains_run(&run_key)? {
            return Err(Error::RunNotFound(run_key));
        }
        info!("Model run was found: {}", run_key);

        if !dest_root.is_dir() {
            fs::create_dir_all(dest_root)?;
        }
        let destination = dest_root.join(run_folder_name(&run_key));
        if !destination.exists() {
            match self.template {
                Some(template) => {
                    debug!("Seeding {} from {}", destination.display(), template.display());
                    util::copy_tree(template, &destination)?;
                }
                None => fs::create_dir_all(&destination)?,
            }
        }

        let mut planned = Vec::new();
        for category in Category::ALL {
            for name in self.ledger.files_for(category, &run_key)? {
                planned.push((category, name));
            }
        }

        let mut report = RebuildReport {
            run_folder: run_key,
            destination: destination.clone(),
            ..RebuildReport::default()
        };

        let total = planned.len();
        reporter.on_rebuild_start(total);
        for (i, (category, name)) in planned.into_iter().enumerate() {
            reporter.on_rebuild_progress(i, total);
            let id = match VariantId::decode(&name) {
                Ok(id) => id,
                Err(e) => {
                    warn!("Skipping {} entry: {}", category, e);
                    report.undecodable.push((category, name));
                    continue;
                }
            };

            let origin = self.archive.path_for(category, &name);
            if !origin.is_file() {
                warn!("Archived copy missing: {}", origin.display());
                report.missing.push((category, name));
                continue;
            }

            let target_dir = category.join_dir(&destination);
            if !target_dir.is_dir() {
                fs::create_dir_all(&target_dir)?;
            }
            util::copy_preserving_mtime(&origin, &target_dir.join(id.original_name()))?;
            report.copied += 1;
        }

        reporter.on_rebuild_progress(total, total);
        reporter.on_rebuild_complete(report.copied, start.elapsed().as_secs_f64());
        if !report.missing.is_empty() {
            warn!(
                "{} archived copies were missing while rebuilding {}",
                report.missing.len(),
                report.run_folder
            );
        }
        Ok(report)
    }
}

/// Last path component, accepting both `/` and `\` separators so Windows
/// share paths logged on another machine still resolve.
pub fn run_folder_name(run_key: &str) -> &str {
    run_key
        .trim_end_matches(is_separator)
        .rsplit(is_separator)
        .next()
        .unwrap_or(run_key)
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}
