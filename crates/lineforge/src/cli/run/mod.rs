//! The `lineforge run` command: the full preprocess → pad → trace → export chain.

mod progress;
mod setup;
pub mod types;

pub use types::{Background, FinishMode, PadFormat};

use clap::Args;
use lineforge_core::{Config, Pipeline};
use std::path::PathBuf;

use progress::{print_summary, ProgressReporter};
use setup::apply_overrides;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Image file or directory to process
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output root; stage directories are created inside it
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Search subdirectories of the input
    #[arg(short, long)]
    pub recursive: bool,

    /// Split .ico containers into frames and rebuild them afterwards
    #[arg(long)]
    pub icons: bool,

    /// Disable stage A (preprocess)
    #[arg(long)]
    pub no_preprocess: bool,

    /// Disable stage B (pad)
    #[arg(long)]
    pub no_pad: bool,

    /// Disable stage C (trace)
    #[arg(long)]
    pub no_trace: bool,

    /// Disable stage D (export)
    #[arg(long)]
    pub no_export: bool,

    /// Final preprocessing treatment
    #[arg(long, value_enum)]
    pub finish_mode: Option<FinishMode>,

    /// Square canvas size in pixels
    #[arg(long)]
    pub pad_size: Option<u32>,

    /// Pad output format
    #[arg(long, value_enum)]
    pub pad_format: Option<PadFormat>,

    /// Pad canvas fill
    #[arg(long, value_enum)]
    pub pad_background: Option<Background>,

    /// Export width in pixels
    #[arg(long)]
    pub export_width: Option<u32>,

    /// Files processed concurrently within a stage
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Do not write a per-run log file
    #[arg(long)]
    pub no_log_file: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Execute the run command.
pub async fn execute(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args)?;

    let reporter = ProgressReporter::new();
    let pipeline = Pipeline::new(config).with_reporter(reporter.clone());
    let result = pipeline.run_all(&args.input, &args.output).await;
    reporter.finish();
    let summary = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}
