//! Stage C: bitmap tracing to SVG.
//!
//! The raster is first cut to a 1-bit PBM by ImageMagick in a scratch
//! directory, then handed to potrace.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::config::TraceParams;
use crate::error::{PipelineError, PipelineResult};
use crate::tools::ExternalCommand;
use crate::types::file_stem;

use super::stage::Transform;

pub struct Trace {
    magick: PathBuf,
    potrace: PathBuf,
    params: TraceParams,
}

impl Trace {
    pub fn new(magick: PathBuf, potrace: PathBuf, params: TraceParams) -> Self {
        Self {
            magick,
            potrace,
            params,
        }
    }

    /// `magick` invocation producing the bitmap potrace reads.
    pub fn bitmap_command(&self, src: &Path, pbm: &Path) -> ExternalCommand {
        let mut cmd = ExternalCommand::new(&self.magick)
            .arg(src)
            .args([
                "-background",
                "white",
                "-alpha",
                "remove",
                "-alpha",
                "off",
                "-colorspace",
                "Gray",
            ]);
        if self.params.invert {
            cmd = cmd.arg("-negate");
        }
        cmd.args([
            "-threshold".to_string(),
            format!("{}%", self.params.cutoff_percent),
        ])
        .prefixed_path("pbm:", pbm)
    }

    /// `potrace` invocation writing the SVG.
    pub fn trace_command(&self, pbm: &Path, dst: &Path) -> ExternalCommand {
        let cmd = ExternalCommand::new(&self.potrace)
            .arg(pbm)
            .arg("-s")
            .arg("-o")
            .arg(dst)
            .args(["--turdsize".to_string(), self.params.speck_size.to_string()]);
        if self.params.smooth {
            cmd
        } else {
            // corner threshold 0 yields straight segments only
            cmd.args(["--alphamax", "0"])
        }
    }
}

#[async_trait]
impl Transform for Trace {
    fn output_extension(&self) -> &'static str {
        "svg"
    }

    async fn apply(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        let scratch = tempfile::Builder::new()
            .prefix("lineforge-trace-")
            .tempdir()
            .map_err(|e| PipelineError::io(std::env::temp_dir(), e))?;
        let pbm = scratch.path().join(format!("{}.pbm", file_stem(input)));

        self.bitmap_command(input, &pbm).run().await?;
        self.trace_command(&pbm, output).run().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(smooth: bool, invert: bool) -> TraceParams {
        TraceParams {
            cutoff_percent: 55,
            invert,
            speck_size: 2,
            smooth,
        }
    }

    fn strings(cmd: &ExternalCommand) -> Vec<String> {
        cmd.arg_list()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_bitmap_command() {
        let trace = Trace::new("magick".into(), "potrace".into(), params(true, false));
        let args = strings(&trace.bitmap_command(Path::new("a.jpg"), Path::new("/tmp/a.pbm")));
        assert_eq!(args[0], "a.jpg");
        assert!(args.windows(2).any(|w| w == ["-threshold", "55%"]));
        assert!(!args.contains(&"-negate".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("pbm:/tmp/a.pbm"));
    }

    #[test]
    fn test_invert_negates_before_threshold() {
        let trace = Trace::new("magick".into(), "potrace".into(), params(true, true));
        let args = strings(&trace.bitmap_command(Path::new("a.png"), Path::new("a.pbm")));
        let negate = args.iter().position(|a| a == "-negate").unwrap();
        let threshold = args.iter().position(|a| a == "-threshold").unwrap();
        assert!(negate < threshold);
    }

    #[test]
    fn test_trace_command_smooth() {
        let trace = Trace::new("magick".into(), "potrace".into(), params(true, false));
        let cmd = trace.trace_command(Path::new("a.pbm"), Path::new("out/a.svg"));
        assert_eq!(cmd.program(), Path::new("potrace"));
        assert_eq!(
            strings(&cmd),
            ["a.pbm", "-s", "-o", "out/a.svg", "--turdsize", "2"]
        );
    }

    #[test]
    fn test_trace_command_polygonal() {
        let trace = Trace::new("magick".into(), "potrace".into(), params(false, false));
        let args = strings(&trace.trace_command(Path::new("a.pbm"), Path::new("a.svg")));
        assert!(args.windows(2).any(|w| w == ["--alphamax", "0"]));
    }
}
