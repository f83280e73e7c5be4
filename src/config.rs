use crate::normalize::PathRule;
use config::{Config, ConfigError, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "Config";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Root holding the archive sub-directories and the ledger CSVs.
    pub ledger_dir: PathBuf,
    /// CSV listing the run folders to catalog.
    #[serde(default)]
    pub run_list_csv: Option<PathBuf>,
    #[serde(default = "default_run_list_column")]
    pub run_list_column: String,
    /// Skeleton folder tree copied into a new ledger root or rebuild target.
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
    /// Output files kept despite being written after the run ended, as
    /// `name.ext` where `name` matches by substring.
    #[serde(default)]
    pub outputs_to_keep: Vec<String>,
    #[serde(default = "default_start_markers")]
    pub start_markers: Vec<String>,
    #[serde(default = "default_end_markers")]
    pub end_markers: Vec<String>,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub path_rules: Vec<PathRule>,
    /// Hash-compare sources against archived copies that already exist.
    #[serde(default = "default_verify_existing")]
    pub verify_existing: bool,
}

impl AppConfig {
    pub fn new(ledger_dir: impl Into<PathBuf>) -> Self {
        Self {
            ledger_dir: ledger_dir.into(),
            run_list_csv: None,
            run_list_column: default_run_list_column(),
            template_dir: None,
            outputs_to_keep: Vec::new(),
            start_markers: default_start_markers(),
            end_markers: default_end_markers(),
            ignore_patterns: Vec::new(),
            path_rules: Vec::new(),
            verify_existing: default_verify_existing(),
        }
    }
}

fn default_run_list_column() -> String {
    "model_runs".to_string()
}

fn default_start_markers() -> Vec<String> {
    vec!["gapstats.txt".to_string(), "timelog.start.txt".to_string()]
}

fn default_end_markers() -> Vec<String> {
    vec![
        "ixxi_taz.csv".to_string(),
        "cveh_taz.csv".to_string(),
        "worker_ixxifractions.csv".to_string(),
        "ixxi_taz.dbf".to_string(),
    ]
}

fn default_verify_existing() -> bool {
    true
}

pub fn load_configuration(name: Option<&str>) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(name.unwrap_or(DEFAULT_CONFIG_NAME)).required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
