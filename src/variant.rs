use crate::error::Error;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};

/// Separator between the original base name and the timestamp tag.
pub const TAG_SEPARATOR: &str = "---";

/// Timestamp layout used in archived file names, e.g. `Mon Mar 04 2024 13-05-09 `.
/// The trailing space is part of the format.
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %Y %H-%M-%S ";

/// The five groups of files a model run depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    RunFolder,
    Input,
    Daysim,
    DaysimCoefficients,
    DaysimSoftware,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::RunFolder,
        Category::Input,
        Category::Daysim,
        Category::DaysimCoefficients,
        Category::DaysimSoftware,
    ];

    /// Supporting folders, scanned from the run folder's parent directory.
    pub const SUPPORTING: [Category; 4] = [
        Category::Input,
        Category::Daysim,
        Category::DaysimCoefficients,
        Category::DaysimSoftware,
    ];

    /// Path segments of the category's archive directory under the ledger root.
    /// Rebuilt runs use the same layout.
    pub fn dir_segments(self) -> &'static [&'static str] {
        match self {
            Category::RunFolder => &["run_folder"],
            Category::Input => &["input"],
            Category::Daysim => &["daysim"],
            Category::DaysimCoefficients => &["daysim", "coefficients"],
            Category::DaysimSoftware => &["daysim", "software"],
        }
    }

    /// Path segments of the supporting folder relative to the run folder's parent.
    /// `None` for the run folder itself.
    pub fn supporting_segments(self) -> Option<&'static [&'static str]> {
        match self {
            Category::RunFolder => None,
            other => Some(other.dir_segments()),
        }
    }

    pub fn ledger_file_name(self) -> &'static str {
        match self {
            Category::RunFolder => "run_file_list.csv",
            Category::Input => "input_file_list.csv",
            Category::Daysim => "daysim_file_list.csv",
            Category::DaysimCoefficients => "daysim_coef_file_list.csv",
            Category::DaysimSoftware => "daysim_software_file_list.csv",
        }
    }

    pub fn join_dir(self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.dir_segments() {
            path.push(segment);
        }
        path
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::RunFolder => "run folder",
            Category::Input => "input",
            Category::Daysim => "daysim",
            Category::DaysimCoefficients => "daysim/coefficients",
            Category::DaysimSoftware => "daysim/software",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identity of one version of a named file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantId {
    pub base_name: String,
    /// Includes the leading dot, empty when the file has no extension.
    pub extension: String,
    /// Whole seconds since the Unix epoch.
    pub modified: i64,
}

impl VariantId {
    pub fn new(file_name: &str, modified: i64) -> Self {
        let (base_name, extension) = split_file_name(file_name);
        Self {
            base_name: base_name.to_string(),
            extension: extension.to_string(),
            modified,
        }
    }

    /// File name with the timestamp tag removed.
    pub fn original_name(&self) -> String {
        format!("{}{}", self.base_name, self.extension)
    }

    pub fn encode(&self) -> String {
        NameCodec::CURRENT.encode(self)
    }

    pub fn decode(encoded: &str) -> Result<Self, Error> {
        NameCodec::CURRENT.decode(encoded)
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match format_timestamp(self.modified) {
            Some(ts) => write!(f, "{} ({})", self.original_name(), ts.trim_end()),
            None => write!(f, "{} (@{})", self.original_name(), self.modified),
        }
    }
}

/// A file seen on disk during a scan.
#[derive(Debug, Clone)]
pub struct FileVariant {
    pub id: VariantId,
    pub source: PathBuf,
    pub category: Category,
}

/// Versioned encoding of a [`VariantId`] into an archive file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCodec {
    /// `<base_name>---<timestamp><extension>`
    V1,
}

impl NameCodec {
    pub const CURRENT: NameCodec = NameCodec::V1;

    pub fn encode(self, id: &VariantId) -> String {
        match self {
            NameCodec::V1 => {
                let stamp = format_timestamp(id.modified)
                    .unwrap_or_else(|| format!("{} ", id.modified));
                format!("{}{}{}{}", id.base_name, TAG_SEPARATOR, stamp, id.extension)
            }
        }
    }

    /// Separators are tried from the right so base names that themselves contain
    /// `---` still decode.
    pub fn decode(self, encoded: &str) -> Result<VariantId, Error> {
        match self {
            NameCodec::V1 => {
                let mut candidates: Vec<usize> = encoded
                    .match_indices(TAG_SEPARATOR)
                    .map(|(idx, _)| idx)
                    .collect();
                candidates.reverse();

                for idx in candidates {
                    let base_name = &encoded[..idx];
                    let rest = &encoded[idx + TAG_SEPARATOR.len()..];
                    let (stamp, extension) = match rest.find('.') {
                        Some(dot) => (&rest[..dot], &rest[dot..]),
                        None => (rest, ""),
                    };
                    if extension.len() > 1 && extension[1..].contains('.') {
                        continue;
                    }
                    if let Some(modified) = parse_timestamp(stamp) {
                        return Ok(VariantId {
                            base_name: base_name.to_string(),
                            extension: extension.to_string(),
                            modified,
                        });
                    }
                }

                Err(Error::InvalidVariantName(encoded.to_string()))
            }
        }
    }
}

/// Split a file name into base name and extension the way most tooling does:
/// the extension starts at the last dot, unless everything before that dot is dots.
pub fn split_file_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if name[..idx].chars().any(|c| c != '.') => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

pub fn format_timestamp(secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

pub fn parse_timestamp(stamp: &str) -> Option<i64> {
    if !stamp.ends_with(' ') {
        return None;
    }
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc().timestamp())
}
