//! Config overrides from command-line flags.

use lineforge_core::Config;

use super::RunArgs;

/// Apply `args` on top of the loaded config and re-validate the result.
pub fn apply_overrides(config: &mut Config, args: &RunArgs) -> anyhow::Result<()> {
    if args.recursive {
        config.input.recursive = true;
    }
    if args.icons {
        config.input.icons = true;
    }

    // Stage toggles
    if args.no_preprocess {
        config.preprocess.enabled = false;
    }
    if args.no_pad {
        config.pad.enabled = false;
    }
    if args.no_trace {
        config.trace.enabled = false;
    }
    if args.no_export {
        config.export.enabled = false;
    }

    if let Some(mode) = args.finish_mode {
        config.preprocess.finish_mode = mode.to_string();
    }
    if let Some(size) = args.pad_size {
        config.pad.size = size;
    }
    if let Some(format) = args.pad_format {
        config.pad.format = format.to_string();
    }
    if let Some(background) = args.pad_background {
        config.pad.background = background.to_string();
    }
    if let Some(width) = args.export_width {
        config.export.width = width;
    }
    if let Some(jobs) = args.jobs {
        config.pipeline.workers = jobs;
    }
    if args.no_log_file {
        config.logging.file = false;
    }

    config.validate()?;
    Ok(())
}
