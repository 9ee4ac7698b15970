//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem for structured logging with support for
//! both human-readable and JSON output formats, plus an optional per-run
//! log file that receives progress lines without ANSI colors.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `verbose` - If true, enables DEBUG level logging; otherwise INFO level.
/// * `json_format` - If true, outputs structured JSON logs; otherwise pretty-printed.
/// * `log_file` - Per-run log file receiving every progress line.
///
/// # Notes
///
/// - Log output goes to stderr (stdout is reserved for data output)
/// - The RUST_LOG environment variable can override the stderr level; the
///   run log keeps its own level so progress lines always reach it
pub fn init(verbose: bool, json_format: bool, log_file: Option<File>) {
    // Build the filter, respecting RUST_LOG if set
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    subscriber(filter, file_level(verbose), json_format, log_file).init();
}

/// Level of the per-run log file, independent of RUST_LOG.
fn file_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Stderr layer under `filter`, plus the run log layer under `file_level`.
fn subscriber(
    filter: EnvFilter,
    file_level: LevelFilter,
    json_format: bool,
    log_file: Option<File>,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    let stderr_layer = if json_format {
        // JSON format for machine parsing
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        // Pretty format for humans
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .boxed()
    };

    let file_layer = log_file.map(|file| {
        fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .with_filter(file_level)
    });

    tracing_subscriber::registry()
        .with(stderr_layer.with_filter(filter))
        .with(file_layer)
}

/// File name of a run log started at `now`.
pub fn run_log_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("lineforge_{}.log", now.format("%Y%m%d_%H%M%S"))
}

/// Create `dir` and open a fresh timestamped log file inside it.
///
/// The file is opened for appending and never truncated.
pub fn open_run_log(dir: &Path) -> std::io::Result<(PathBuf, File)> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(run_log_name(chrono::Local::now()));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Initialize logging with configuration from Config.
///
/// This variant reads settings from the LineForge configuration file.
pub fn init_from_config(
    config: &lineforge_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
    log_file: Option<File>,
) {
    let verbose =
        verbose_override || config.logging.level == "debug" || config.logging.level == "trace";
    let json_format = json_logs_override || config.logging.format == "json";
    init(verbose, json_format, log_file);
}
