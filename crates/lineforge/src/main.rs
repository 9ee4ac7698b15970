//! LineForge CLI - turn raster images into vector line art.
//!
//! Runs a fixed chain of stages over a file or directory, each writing into
//! its own numbered directory under the output root:
//! preprocess (ImageMagick), pad, trace (potrace), export (Inkscape).
//!
//! # Usage
//!
//! ```bash
//! # Run the full chain over a directory
//! lineforge run ./art -o ./out
//!
//! # Two-tone input, PNG padding, icons split and rebuilt
//! lineforge run ./icons --icons --finish-mode threshold --pad-format png
//!
//! # See what a run would pick up
//! lineforge scan ./art --recursive
//!
//! # Check external tools
//! lineforge tools
//! ```

use clap::{Parser, Subcommand};
use lineforge_core::Config;
use std::fs::File;
use std::path::{Path, PathBuf};

mod cli;
mod logging;

/// LineForge - raster to vector line art.
#[derive(Parser, Debug)]
#[command(name = "lineforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the platform default
    #[arg(short, long, global = true, env = "LINEFORGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the pipeline over an image or directory
    Run(cli::run::RunArgs),

    /// List the images a run would process
    Scan(cli::scan::ScanArgs),

    /// Show where each external tool resolves
    Tools(cli::tools::ToolsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

/// Load the config at an explicit path, or the default one with a fallback.
///
/// Logging isn't initialized yet, so warnings go through eprintln.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Ok(Config::load_from(path)?);
    }
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `lineforge config path`."
            );
            Ok(Config::default())
        }
    }
}

/// Open the per-run log file when the command is `run` and logging to file is on.
fn run_log_file(command: &Commands, config: &Config) -> Option<File> {
    let Commands::Run(args) = command else {
        return None;
    };
    if args.no_log_file || !config.logging.file {
        return None;
    }
    match logging::open_run_log(&config.log_dir()) {
        Ok((path, file)) => {
            eprintln!("Logging to {}", path.display());
            Some(file)
        }
        Err(e) => {
            eprintln!("Warning: could not create run log in {}: {e}", config.log_dir().display());
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let log_file = run_log_file(&cli.command, &config);
    logging::init_from_config(&config, cli.verbose, cli.json_logs, log_file);

    tracing::debug!("LineForge v{}", lineforge_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Scan(args) => cli::scan::execute(args, config).await,
        Commands::Tools(args) => cli::tools::execute(args, config).await,
        Commands::Config(args) => {
            let path = cli.config.unwrap_or_else(Config::default_path);
            cli::config::execute(args, &config, &path).await
        }
    }
}
