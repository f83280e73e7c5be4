use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "model-catalog")]
#[command(about = "Catalog, compare and rebuild model run inputs", long_about = None)]
pub struct Cli {
    /// Configuration file name, without extension
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log the input files of every listed run and archive new file versions
    Catalog {
        /// CSV of run folders, overrides run_list_csv from the configuration
        #[arg(long)]
        run_list: Option<PathBuf>,
    },
    /// Rebuild a logged run's input files into a new folder
    Rebuild {
        /// Run folder path as logged in the ledger
        run: String,
        /// Folder the run is rebuilt under
        dest: PathBuf,
    },
    /// List input files that differ between two logged runs
    Compare { first: String, second: String },
    /// List runs in the ledger with their file counts
    ListRuns,
    /// Print configuration values
    PrintConfig,
}
