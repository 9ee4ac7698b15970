//! The `lineforge tools` command: report where each external tool resolves.

use clap::Args;
use lineforge_core::{Config, Tool, ToolLocator};
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the `tools` command.
#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ToolStatus {
    tool: Tool,
    needed_for: &'static str,
    path: Option<PathBuf>,
}

fn needed_for(tool: Tool) -> &'static str {
    match tool {
        Tool::Magick => "preprocess, trace bitmap, icons",
        Tool::Potrace => "trace",
        Tool::Inkscape => "export",
    }
}

fn statuses(locator: &ToolLocator) -> Vec<ToolStatus> {
    Tool::ALL
        .iter()
        .map(|&tool| ToolStatus {
            tool,
            needed_for: needed_for(tool),
            path: locator.find(tool),
        })
        .collect()
}

/// Execute the tools command.
pub async fn execute(args: ToolsArgs, config: Config) -> anyhow::Result<()> {
    let report = statuses(&ToolLocator::new(config.tools));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for status in &report {
        let location = status
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "not found".to_string());
        println!(
            "  {:<22} {:<32} {}",
            status.tool.to_string(),
            status.needed_for,
            location
        );
    }

    if report.iter().any(|s| s.path.is_none()) {
        eprintln!(
            "\n  Hint: install the missing tools or set their paths under [tools] in {}",
            Config::default_path().display()
        );
    }

    Ok(())
}
