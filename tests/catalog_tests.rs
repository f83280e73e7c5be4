mod common;

use common::{create_model_run, file_names, path_str, write_with_mtime, write_with_mtime_millis};
use model_catalog::archive::Archive;
use model_catalog::ledger::Ledger;
use model_catalog::normalize::PathRule;
use model_catalog::{AppConfig, CatalogEngine, Category, SilentReporter, VariantId};
use std::fs;
use tempfile::tempdir;

fn encoded(name: &str, secs: i64) -> String {
    VariantId::new(name, secs).encode()
}

#[test]
fn test_run_window_classification() {
    let tmp = tempdir().unwrap();
    let run = tmp.path().join("2035").join("run_2035");
    write_with_mtime(&run.join("old_input.csv"), "old", 500);
    write_with_mtime(&run.join("gapstats.txt"), "gap", 1_000);
    write_with_mtime(&run.join("middle.txt"), "during run", 1_500);
    write_with_mtime(&run.join("ixxi_taz.csv"), "ixxi", 2_000);
    write_with_mtime(&run.join("report.pdf"), "report", 3_000);
    write_with_mtime(&run.join("scratch.pdf.tmp"), "tmp", 3_000);

    let mut config = AppConfig::new(tmp.path().join("ledger"));
    config.outputs_to_keep = vec!["report.pdf".to_string()];
    let engine = CatalogEngine::new(config);
    let result = engine.catalog(&[path_str(&run)], &SilentReporter).unwrap();

    assert_eq!(result.runs_scanned, 1);
    assert_eq!(result.runs_not_started, 0);
    assert_eq!(result.runs_not_ended, 0);

    let ledger = Ledger::new(tmp.path().join("ledger"));
    let logged = ledger.files_for(Category::RunFolder, &path_str(&run)).unwrap();
    assert_eq!(
        logged,
        vec![encoded("old_input.csv", 500), encoded("report.pdf", 3_000)]
    );

    let archived = file_names(&tmp.path().join("ledger").join("run_folder"));
    assert_eq!(archived.len(), 2);
    assert!(!archived.iter().any(|n| n.starts_with("middle")));
    assert!(!archived.iter().any(|n| n.starts_with("gapstats")));
}

#[test]
fn test_missing_start_marker_treats_every_file_as_input() {
    let tmp = tempdir().unwrap();
    let run = tmp.path().join("scenario").join("run_never_started");
    write_with_mtime(&run.join("epoch.dat"), "zero", 0);
    write_with_mtime(&run.join("later.dat"), "later", 4_000_000_000);
    write_with_mtime(&run.join("ixxi_taz.csv"), "ixxi", 2_000);

    let engine = CatalogEngine::new(AppConfig::new(tmp.path().join("ledger")));
    let result = engine.catalog(&[path_str(&run)], &SilentReporter).unwrap();
    assert_eq!(result.runs_not_started, 1);

    let ledger = Ledger::new(tmp.path().join("ledger"));
    let logged = ledger.files_for(Category::RunFolder, &path_str(&run)).unwrap();
    assert_eq!(logged.len(), 3);
    assert!(logged.contains(&encoded("epoch.dat", 0)));
    assert!(logged.contains(&encoded("later.dat", 4_000_000_000)));
}

#[test]
fn test_missing_end_marker_keeps_no_outputs() {
    let tmp = tempdir().unwrap();
    let run = tmp.path().join("scenario").join("run_never_ended");
    write_with_mtime(&run.join("input.csv"), "in", 100);
    write_with_mtime(&run.join("gapstats.txt"), "gap", 1_000);
    write_with_mtime(&run.join("2035_daynet.net"), "net", 9_000);

    let mut config = AppConfig::new(tmp.path().join("ledger"));
    config.outputs_to_keep = vec!["daynet.net".to_string()];
    let engine = CatalogEngine::new(config);
    let result = engine.catalog(&[path_str(&run)], &SilentReporter).unwrap();
    assert_eq!(result.runs_not_ended, 1);

    let ledger = Ledger::new(tmp.path().join("ledger"));
    let logged = ledger.files_for(Category::RunFolder, &path_str(&run)).unwrap();
    assert_eq!(logged, vec![encoded("input.csv", 100)]);
}

#[test]
fn test_keep_list_matches_name_fragment() {
    let tmp = tempdir().unwrap();
    let run = create_model_run(tmp.path(), "2035", "run_2035");
    write_with_mtime(&run.join("2035_daynet.net"), "net", 2_500);
    write_with_mtime(&run.join("2035_daynet.dbf"), "dbf", 2_500);

    let mut config = AppConfig::new(tmp.path().join("ledger"));
    config.outputs_to_keep = vec!["daynet.net".to_string(), "pathwayind.csv".to_string()];
    CatalogEngine::new(config)
        .catalog(&[path_str(&run)], &SilentReporter)
        .unwrap();

    let ledger = Ledger::new(tmp.path().join("ledger"));
    let logged = ledger.files_for(Category::RunFolder, &path_str(&run)).unwrap();
    assert!(logged.contains(&encoded("2035_daynet.net", 2_500)));
    assert!(!logged.contains(&encoded("2035_daynet.dbf", 2_500)));
}

#[test]
fn test_output_written_within_end_marker_second_is_kept() {
    let tmp = tempdir().unwrap();
    let run = tmp.path().join("2035").join("run_2035");
    write_with_mtime_millis(&run.join("gapstats.txt"), "gap", 1_000_000);
    write_with_mtime_millis(&run.join("ixxi_taz.csv"), "ixxi", 2_000_100);
    write_with_mtime_millis(&run.join("2035_daynet.net"), "net", 2_000_600);

    let mut config = AppConfig::new(tmp.path().join("ledger"));
    config.outputs_to_keep = vec!["daynet.net".to_string()];
    CatalogEngine::new(config)
        .catalog(&[path_str(&run)], &SilentReporter)
        .unwrap();

    let ledger = Ledger::new(tmp.path().join("ledger"));
    let logged = ledger.files_for(Category::RunFolder, &path_str(&run)).unwrap();
    assert_eq!(logged, vec![encoded("2035_daynet.net", 2_000)]);
    assert_eq!(
        file_names(&tmp.path().join("ledger").join("run_folder")),
        vec![encoded("2035_daynet.net", 2_000)]
    );
}

#[test]
fn test_supporting_folders_are_logged_per_category() {
    let tmp = tempdir().unwrap();
    let run = create_model_run(tmp.path(), "2035", "run_2035");
    let engine = CatalogEngine::new(AppConfig::new(tmp.path().join("ledger")));
    let result = engine.catalog(&[path_str(&run)], &SilentReporter).unwrap();

    let ledger = Ledger::new(tmp.path().join("ledger"));
    let key = path_str(&run);
    assert_eq!(
        ledger.files_for(Category::Input, &key).unwrap(),
        vec![encoded("taz.csv", 400)]
    );
    assert_eq!(
        ledger.files_for(Category::Daysim, &key).unwrap(),
        vec![encoded("daysim.exe.config", 300)]
    );
    assert_eq!(
        ledger.files_for(Category::DaysimCoefficients, &key).unwrap(),
        vec![encoded("mode_choice.f12", 200)]
    );
    assert_eq!(
        ledger.files_for(Category::DaysimSoftware, &key).unwrap(),
        vec![encoded("Daysim.exe", 100)]
    );

    // raw_parcel.txt is the only file older than gapstats.txt
    assert_eq!(result.files_copied, 5);
    assert_eq!(result.rows_appended(), 5);
    assert_eq!(result.runs_logged(), 1);

    let archive = Archive::new(tmp.path().join("ledger"));
    for category in Category::ALL {
        assert_eq!(archive.count(category).unwrap(), 1, "{}", category);
    }
}

#[test]
fn test_same_name_different_mtime_are_both_archived() {
    let tmp = tempdir().unwrap();
    let run_a = create_model_run(tmp.path(), "2027", "run_a");
    let run_b = create_model_run(tmp.path(), "2035", "run_b");
    write_with_mtime(&tmp.path().join("2035/input/taz.csv"), "taz,pop\n1,99\n", 450);

    let engine = CatalogEngine::new(AppConfig::new(tmp.path().join("ledger")));
    let result = engine
        .catalog(&[path_str(&run_a), path_str(&run_b)], &SilentReporter)
        .unwrap();

    let input_dir = tmp.path().join("ledger").join("input");
    assert_eq!(
        file_names(&input_dir),
        {
            let mut names = vec![encoded("taz.csv", 400), encoded("taz.csv", 450)];
            names.sort();
            names
        }
    );
    assert_eq!(
        fs::read_to_string(input_dir.join(encoded("taz.csv", 450))).unwrap(),
        "taz,pop\n1,99\n"
    );

    // Identical variants across the two scenarios are stored once
    let archive = Archive::new(tmp.path().join("ledger"));
    assert_eq!(archive.count(Category::DaysimSoftware).unwrap(), 1);
    assert_eq!(archive.count(Category::RunFolder).unwrap(), 1);
    assert!(result.files_reused > 0);
}

#[test]
fn test_recatalog_is_idempotent() {
    let tmp = tempdir().unwrap();
    let run = create_model_run(tmp.path(), "2035", "run_2035");
    let ledger_dir = tmp.path().join("ledger");
    let run_list = tmp.path().join("run_list.csv");
    fs::write(&run_list, format!("model_runs\n{}\n", path_str(&run))).unwrap();

    let mut config = AppConfig::new(&ledger_dir);
    config.run_list_csv = Some(run_list);
    let engine = CatalogEngine::new(config);

    engine.run(&SilentReporter).unwrap();
    let ledger = Ledger::new(&ledger_dir);
    let rows_before: Vec<usize> = Category::ALL
        .iter()
        .map(|c| ledger.rows(*c).unwrap().len())
        .collect();
    let archived_before = file_names(&ledger_dir.join("input"));

    let second = engine.run(&SilentReporter).unwrap();
    assert_eq!(second.files_copied, 0);
    assert_eq!(second.rows_appended(), 0);
    assert_eq!(second.integrity_mismatches, 0);

    let rows_after: Vec<usize> = Category::ALL
        .iter()
        .map(|c| ledger.rows(*c).unwrap().len())
        .collect();
    assert_eq!(rows_before, rows_after);
    assert_eq!(archived_before, file_names(&ledger_dir.join("input")));
}

#[test]
fn test_changed_run_is_not_relogged() {
    let tmp = tempdir().unwrap();
    let run = create_model_run(tmp.path(), "2035", "run_2035");
    let engine = CatalogEngine::new(AppConfig::new(tmp.path().join("ledger")));
    engine.catalog(&[path_str(&run)], &SilentReporter).unwrap();

    write_with_mtime(&run.join("new_input.csv"), "late addition", 600);
    let second = engine.catalog(&[path_str(&run)], &SilentReporter).unwrap();

    // The new variant is archived, but the run's ledger rows stay as first logged
    assert_eq!(second.files_copied, 1);
    let ledger = Ledger::new(tmp.path().join("ledger"));
    let logged = ledger.files_for(Category::RunFolder, &path_str(&run)).unwrap();
    assert_eq!(logged, vec![encoded("raw_parcel.txt", 500)]);
}

#[test]
fn test_archived_copy_is_never_overwritten() {
    let tmp = tempdir().unwrap();
    let run = create_model_run(tmp.path(), "2035", "run_2035");
    let engine = CatalogEngine::new(AppConfig::new(tmp.path().join("ledger")));
    engine.catalog(&[path_str(&run)], &SilentReporter).unwrap();

    // Same name and mtime, different bytes
    write_with_mtime(&tmp.path().join("2035/input/taz.csv"), "tampered", 400);
    let second = engine.catalog(&[path_str(&run)], &SilentReporter).unwrap();
    assert_eq!(second.integrity_mismatches, 1);

    let archived = tmp.path().join("ledger/input").join(encoded("taz.csv", 400));
    assert_eq!(fs::read_to_string(archived).unwrap(), "taz,pop\n1,10\n");
}

#[test]
fn test_missing_run_folder_is_skipped() {
    let tmp = tempdir().unwrap();
    let run = create_model_run(tmp.path(), "2035", "run_2035");
    let missing = path_str(&tmp.path().join("2035/run_gone"));

    let engine = CatalogEngine::new(AppConfig::new(tmp.path().join("ledger")));
    let result = engine
        .catalog(&[missing.clone(), path_str(&run)], &SilentReporter)
        .unwrap();

    assert_eq!(result.runs_listed, 2);
    assert_eq!(result.runs_scanned, 1);
    assert_eq!(result.runs_missing, vec![missing]);
    let ledger = Ledger::new(tmp.path().join("ledger"));
    assert_eq!(ledger.runs().unwrap(), vec![path_str(&run)]);
}

#[test]
fn test_path_rules_normalize_ledger_keys() {
    let tmp = tempdir().unwrap();
    let run = create_model_run(tmp.path(), "2035", "run_2035");
    let real_root = format!("{}/", path_str(tmp.path()));
    let alias = "/alias-share/D/".to_string();
    let aliased_run = format!("{}2035/run_2035", alias);

    let mut config = AppConfig::new(tmp.path().join("ledger"));
    config.path_rules = vec![PathRule::new(&alias, &real_root)];
    let result = CatalogEngine::new(config)
        .catalog(&[aliased_run], &SilentReporter)
        .unwrap();

    assert_eq!(result.runs_scanned, 1);
    let ledger = Ledger::new(tmp.path().join("ledger"));
    assert!(ledger.contains_run(&path_str(&run)).unwrap());
}

#[test]
fn test_ignore_patterns_skip_files() {
    let tmp = tempdir().unwrap();
    let run = create_model_run(tmp.path(), "2035", "run_2035");
    write_with_mtime(&run.join("scratch.tmp"), "tmp", 10);

    let mut config = AppConfig::new(tmp.path().join("ledger"));
    config.ignore_patterns = vec!["*.tmp".to_string()];
    CatalogEngine::new(config)
        .catalog(&[path_str(&run)], &SilentReporter)
        .unwrap();

    let ledger = Ledger::new(tmp.path().join("ledger"));
    let logged = ledger.files_for(Category::RunFolder, &path_str(&run)).unwrap();
    assert_eq!(logged, vec![encoded("raw_parcel.txt", 500)]);
}

#[test]
fn test_ledger_root_seeded_from_template() {
    let tmp = tempdir().unwrap();
    let run = create_model_run(tmp.path(), "2035", "run_2035");
    let template = tmp.path().join("file_output");
    fs::create_dir_all(template.join("daysim/coefficients")).unwrap();
    fs::write(template.join("README.txt"), "ledger layout").unwrap();

    let mut config = AppConfig::new(tmp.path().join("ledger"));
    config.template_dir = Some(template);
    CatalogEngine::new(config)
        .catalog(&[path_str(&run)], &SilentReporter)
        .unwrap();

    let ledger_dir = tmp.path().join("ledger");
    assert_eq!(
        fs::read_to_string(ledger_dir.join("README.txt")).unwrap(),
        "ledger layout"
    );
    assert!(ledger_dir.join("run_file_list.csv").is_file());
}
