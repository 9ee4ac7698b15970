//! Stage A: grayscale/threshold/quantize raster filter via ImageMagick.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::config::{Finish, PreprocessParams};
use crate::error::PipelineResult;
use crate::tools::ExternalCommand;

use super::stage::Transform;

/// Filters a raster and always writes PNG.
pub struct Preprocess {
    magick: PathBuf,
    params: PreprocessParams,
}

impl Preprocess {
    pub fn new(magick: PathBuf, params: PreprocessParams) -> Self {
        Self { magick, params }
    }

    /// Build the `magick` invocation for one file.
    ///
    /// Alpha is flattened against white and metadata stripped before the
    /// toggles apply; the finish treatment comes last.
    pub fn command(&self, src: &Path, dst: &Path) -> ExternalCommand {
        let p = &self.params;
        let mut cmd = ExternalCommand::new(&self.magick)
            .arg(src)
            .args(["-background", "white", "-alpha", "remove", "-alpha", "off"])
            .arg("-strip");

        if p.grayscale {
            cmd = cmd.args(["-colorspace", "Gray"]);
        }
        if p.auto_level {
            cmd = cmd.arg("-auto-level");
        }
        if let Some((black, white)) = p.contrast_stretch {
            cmd = cmd.args(["-contrast-stretch".to_string(), format!("{black}%x{white}%")]);
        }
        if p.median > 0 {
            cmd = cmd.args(["-median".to_string(), p.median.to_string()]);
        }
        if p.blur > 0.0 {
            cmd = cmd.args(["-blur".to_string(), format!("0x{}", p.blur)]);
        }
        if p.negate {
            cmd = cmd.arg("-negate");
        }

        match p.finish {
            Finish::None => {}
            Finish::Threshold { percent } => {
                cmd = cmd.args(["-threshold".to_string(), format!("{percent}%")]);
            }
            Finish::Quantize { levels } => {
                cmd = cmd
                    .args(["-colorspace", "Gray", "+dither", "-colors"])
                    .arg(levels.to_string());
            }
        }

        cmd.prefixed_path("png:", dst)
    }
}

#[async_trait]
impl Transform for Preprocess {
    fn output_extension(&self) -> &'static str {
        "png"
    }

    async fn apply(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        self.command(input, output).run().await?;
        Ok(())
    }
}
