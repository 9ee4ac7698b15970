//! The `lineforge scan` command: list the images a run would pick up.

use clap::Args;
use lineforge_core::{Config, FileDiscovery, ImageKind};
use std::path::PathBuf;

/// Arguments for the `scan` command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Image file or directory to scan
    #[arg(required = true)]
    pub input: PathBuf,

    /// Search subdirectories of the input
    #[arg(short, long)]
    pub recursive: bool,

    /// Include .ico containers
    #[arg(long)]
    pub icons: bool,

    /// Print the resolved images as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the scan command.
pub async fn execute(args: ScanArgs, config: Config) -> anyhow::Result<()> {
    let recursive = args.recursive || config.input.recursive;
    let icons = args.icons || config.input.icons;
    let files = FileDiscovery::new(recursive, icons).resolve(&args.input)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    for file in &files {
        match file.kind {
            ImageKind::IconContainer => println!("{}  (icon)", file.path.display()),
            _ => println!("{}", file.path.display()),
        }
    }
    tracing::info!("Found {} image(s) in {}", files.len(), args.input.display());
    if files.is_empty() && !recursive {
        tracing::info!("Hint: enable recursive search (--recursive)");
    }

    Ok(())
}
