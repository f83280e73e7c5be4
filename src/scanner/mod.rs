pub mod folder;
pub mod window;

pub use folder::{scan_run_folder, scan_supporting_folder, FolderScan, KeepRule, ScanRules};
pub use window::{detect_run_window, RunWindow};
