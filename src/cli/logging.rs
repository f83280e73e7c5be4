use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/model_catalog.log";

/// `TRACING_LEVEL` accepts filter directives, e.g. `model_catalog=debug,info`.
fn level_filter() -> EnvFilter {
    let directives = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    EnvFilter::try_new(&directives).unwrap_or_else(|err| {
        eprintln!("Invalid TRACING_LEVEL '{}': {}, using info", directives, err);
        EnvFilter::new("info")
    })
}

/// Directory and file name for the appender.
fn split_log_path(path: &Path) -> (PathBuf, String) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model_catalog.log".to_string());
    (dir, file)
}

/// Console output plus a log file (`LOG_FILE_PATH`) that accumulates across
/// catalog and rebuild invocations. Keep the guard alive until exit.
pub fn init_logger() -> WorkerGuard {
    let log_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (dir, file) = split_log_path(Path::new(&log_path));

    let (non_blocking, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, &file));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_thread_ids(false),
        )
        .with(level_filter())
        .init();

    debug!("Logging to {}", dir.join(&file).display());

    guard
}
