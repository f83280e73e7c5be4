pub mod archive;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod normalize;
pub mod progress;
pub mod rebuild;
pub mod scanner;
pub mod util;
pub mod variant;

pub use config::AppConfig;
pub use engine::{CatalogEngine, CatalogResult};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use rebuild::{RebuildReport, Rebuilder};
pub use variant::{Category, FileVariant, VariantId};
