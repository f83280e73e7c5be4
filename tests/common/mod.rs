#![allow(dead_code)]

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

/// Write a file and set its modification time to `secs` after the epoch.
pub fn write_with_mtime(path: &Path, contents: &str, secs: u64) {
    write_with_mtime_millis(path, contents, secs * 1_000);
}

pub fn write_with_mtime_millis(path: &Path, contents: &str, millis: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
    OpenOptions::new()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(UNIX_EPOCH + Duration::from_millis(millis))
        .unwrap();
}

/// Lay out a model run directory:
///   <root>/<scenario>/
///     <run>/            gapstats.txt (T0=1000), ixxi_taz.csv (T1=2000)
///     input/            taz.csv
///     daysim/           daysim.exe.config
///     daysim/coefficients/  mode_choice.f12
///     daysim/software/  Daysim.exe
///   Returns the run folder path.
pub fn create_model_run(root: &Path, scenario: &str, run: &str) -> PathBuf {
    let scenario_dir = root.join(scenario);
    let run_dir = scenario_dir.join(run);
    fs::create_dir_all(&run_dir).unwrap();

    write_with_mtime(&run_dir.join("gapstats.txt"), "gap", 1_000);
    write_with_mtime(&run_dir.join("ixxi_taz.csv"), "ixxi", 2_000);
    write_with_mtime(&run_dir.join("raw_parcel.txt"), "parcels", 500);

    write_with_mtime(&scenario_dir.join("input/taz.csv"), "taz,pop\n1,10\n", 400);
    write_with_mtime(&scenario_dir.join("daysim/daysim.exe.config"), "<cfg/>", 300);
    write_with_mtime(
        &scenario_dir.join("daysim/coefficients/mode_choice.f12"),
        "coef",
        200,
    );
    write_with_mtime(&scenario_dir.join("daysim/software/Daysim.exe"), "bin", 100);

    run_dir
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .flatten()
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
