mod cli;

use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::commands::{Cli, Commands};
use cli::progress::CliReporter;
use colored::*;
use dotenv::dotenv;
use model_catalog::archive::Archive;
use model_catalog::compare::{compare_runs, RunComparison};
use model_catalog::ledger::Ledger;
use model_catalog::variant::VariantId;
use model_catalog::{AppConfig, CatalogEngine, Category, Rebuilder};
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let _guard = cli::logging::init_logger();

    let args = Cli::parse();

    let config = match model_catalog::config::load_configuration(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let outcome = match args.command {
        Some(Commands::Catalog { run_list }) => run_catalog(config, run_list),
        Some(Commands::Rebuild { run, dest }) => run_rebuild(&config, &run, &dest),
        Some(Commands::Compare { first, second }) => run_compare(&config, &first, &second),
        Some(Commands::ListRuns) => run_list_runs(&config),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run_catalog(mut config: AppConfig, run_list: Option<std::path::PathBuf>) -> Result<()> {
    if run_list.is_some() {
        config.run_list_csv = run_list;
    }
    let engine = CatalogEngine::new(config);
    let reporter = CliReporter::new();
    let result = engine.run(&reporter).context("catalog failed")?;

    println!();
    info!(
        "Catalog: {}, {} runs scanned of {} listed into {}",
        format!("{:.2}s", result.duration.as_secs_f64()).green(),
        format!("{}", result.runs_scanned).green(),
        result.runs_listed,
        engine.config().ledger_dir.display(),
    );
    info!(
        "{} files archived, {} already archived, {} ledger rows appended",
        format!("{}", result.files_copied).cyan(),
        format!("{}", result.files_reused).cyan(),
        format!("{}", result.rows_appended()).cyan(),
    );
    for (category, stats) in &result.appended {
        if stats.runs_skipped > 0 {
            info!("{}: {} runs were already logged and skipped", category, stats.runs_skipped);
        }
    }
    if result.runs_not_started > 0 || result.runs_not_ended > 0 {
        warn!(
            "{} runs did not start, {} runs did not end",
            format!("{}", result.runs_not_started).yellow(),
            format!("{}", result.runs_not_ended).yellow(),
        );
    }
    if result.integrity_mismatches > 0 {
        warn!(
            "{} source files differ from their archived copies",
            format!("{}", result.integrity_mismatches).red(),
        );
    }
    for missing in &result.runs_missing {
        warn!("Could not find: {}", missing);
    }

    Ok(())
}

fn run_rebuild(config: &AppConfig, run: &str, dest: &std::path::Path) -> Result<()> {
    let ledger = Ledger::new(&config.ledger_dir);
    let archive = Archive::new(&config.ledger_dir);
    let rebuilder = Rebuilder::new(&ledger, &archive)
        .with_template(config.template_dir.as_deref())
        .with_path_rules(&config.path_rules);

    let reporter = CliReporter::new();
    let report = rebuilder
        .rebuild(run, dest, &reporter)
        .with_context(|| format!("rebuild of {} failed", run))?;

    info!(
        "{} files restored into {}",
        format!("{}", report.copied).green(),
        report.destination.display()
    );
    for (category, name) in &report.missing {
        warn!("{} {} is missing from the archive", category, name.red());
    }
    for (category, name) in &report.undecodable {
        warn!("{} entry {} could not be decoded", category, name.red());
    }
    Ok(())
}

fn run_compare(config: &AppConfig, first: &str, second: &str) -> Result<()> {
    let ledger = Ledger::new(&config.ledger_dir);
    let comparison = compare_runs(&ledger, first, second, &config.path_rules)?;
    print_comparison(&comparison);
    Ok(())
}

fn display_name(encoded: &str) -> String {
    match VariantId::decode(encoded) {
        Ok(id) => id.to_string(),
        Err(_) => encoded.to_string(),
    }
}

fn print_comparison(comparison: &RunComparison) {
    for diff in &comparison.categories {
        println!();
        if diff.is_identical() {
            println!("The {} folders are {}", diff.category, "identical".green());
            continue;
        }
        if !diff.only_in_first.is_empty() {
            println!("The first model run has these unique {} files:", diff.category);
            for name in &diff.only_in_first {
                println!("  {}", display_name(name).yellow());
            }
        }
        if !diff.only_in_second.is_empty() {
            println!("The second model run has these unique {} files:", diff.category);
            for name in &diff.only_in_second {
                println!("  {}", display_name(name).yellow());
            }
        }
    }
}

fn run_list_runs(config: &AppConfig) -> Result<()> {
    let ledger = Ledger::new(&config.ledger_dir);
    let runs = ledger.runs()?;
    if runs.is_empty() {
        println!("No runs logged in {}", ledger.root().display());
        return Ok(());
    }

    let mut counts: Vec<Vec<usize>> = Vec::with_capacity(runs.len());
    for run in &runs {
        let mut per_category = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            per_category.push(ledger.files_for(category, run)?.len());
        }
        counts.push(per_category);
    }

    for (run, per_category) in runs.iter().zip(counts) {
        let summary: Vec<String> = Category::ALL
            .iter()
            .zip(per_category)
            .map(|(category, count)| format!("{} {}", count, category))
            .collect();
        println!("{}", run.cyan());
        println!("    {}", summary.join(", "));
    }
    Ok(())
}
